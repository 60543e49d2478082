/// Sink for diagnostics produced while resolving configuration.
pub trait Reporter {
    fn info(&mut self, msg: &str);
    fn warn(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
}

/// Reporter that keeps every message, for callers that inspect them later.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectingReporter {
    pub infos: Vec<String>,
    pub warns: Vec<String>,
    pub errors: Vec<String>,
}

impl Reporter for CollectingReporter {
    fn info(&mut self, msg: &str) {
        self.infos.push(msg.to_string());
    }

    fn warn(&mut self, msg: &str) {
        self.warns.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }
}
