use crate::library::logger::interface::Logger;
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LoggerConsole {
    namespace: Option<String>,
    timezone: chrono::FixedOffset,
}

impl LoggerConsole {
    pub fn new(timezone: chrono::FixedOffset) -> Self {
        Self {
            namespace: None,
            timezone,
        }
    }

    fn format_line(&self, level: &str, message: &str) -> String {
        let local_time = Utc::now().with_timezone(&self.timezone);
        let formatted = local_time.format("%Y-%m-%d %I:%M:%S%.3f %p");
        match &self.namespace {
            Some(namespace) => format!("[{}] {} {}: {}", formatted, level, namespace, message),
            None => format!("[{}] {} {}", formatted, level, message),
        }
    }

    fn nested(&self, namespace: &str) -> LoggerConsole {
        let new_namespace = match &self.namespace {
            Some(current) => format!("{}:{}", current, namespace),
            None => namespace.to_string(),
        };

        LoggerConsole {
            namespace: Some(new_namespace),
            timezone: self.timezone,
        }
    }
}

impl Logger for LoggerConsole {
    fn info(&self, message: &str) {
        println!("{}", self.format_line("INFO", message));
    }

    fn warn(&self, message: &str) {
        eprintln!("{}", self.format_line("WARN", message));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", self.format_line("ERROR", message));
    }

    fn with_namespace(&self, namespace: &str) -> Arc<dyn Logger> {
        Arc::new(self.nested(namespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_line_without_namespace() {
        let logger = LoggerConsole::new(utc());
        let line = logger.format_line("INFO", "hello");
        assert!(line.ends_with("] INFO hello"));
    }

    #[test]
    fn test_nested_namespaces_are_joined() {
        let logger = LoggerConsole::new(utc()).nested("pipeline");
        assert!(logger.format_line("WARN", "slow").ends_with("] WARN pipeline: slow"));

        let nested = logger.nested("chart");
        assert!(nested.format_line("ERROR", "x").ends_with("] ERROR pipeline:chart: x"));

        // the parent keeps its own namespace
        assert!(logger.format_line("INFO", "y").ends_with("] INFO pipeline: y"));
    }

    #[test]
    fn test_with_namespace_returns_working_logger() {
        let logger = LoggerConsole::new(utc())
            .with_namespace("pipeline")
            .with_namespace("chart");
        logger.info("info");
        logger.warn("warn");
        logger.error("error");
    }
}
