use thiserror::Error;

/// Failures raised while turning a chart configuration into a render spec.
///
/// None of these escape `compiler::compile`: each one is logged and replaced
/// with degraded output (a dropped series, a coerced value, a fallback spec).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("dataset has no {0}")]
    DataShape(&'static str),

    #[error("no numeric column available for the value axis")]
    NoValueColumn,

    #[error("additional axis '{id}' is malformed: {reason}")]
    MalformedAxis { id: String, reason: String },

    #[error("value {value} in column '{column}' is not numeric")]
    NumericCoercion { column: String, value: String },
}

/// Failures raised by a render backend while materialising a spec.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to draw chart '{chart_id}': {message}")]
    Draw { chart_id: String, message: String },

    #[error("failed to encode chart '{chart_id}' as {format}: {message}")]
    Encode {
        chart_id: String,
        format: &'static str,
        message: String,
    },
}

impl RenderError {
    pub fn chart_id(&self) -> &str {
        match self {
            RenderError::Draw { chart_id, .. } | RenderError::Encode { chart_id, .. } => chart_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = CompileError::MissingColumn("revenue".to_string());
        assert_eq!(err.to_string(), "column 'revenue' not found in dataset");

        let err = RenderError::Draw {
            chart_id: "c1".to_string(),
            message: "bad range".to_string(),
        };
        assert_eq!(err.chart_id(), "c1");
        assert_eq!(err.to_string(), "failed to draw chart 'c1': bad range");
    }
}
