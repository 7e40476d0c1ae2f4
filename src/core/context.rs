use crate::domain::model::{CheckOutcome, CheckStatus};
use serde_json::Value;
use std::collections::HashMap;

/// 執行上下文，在檢查之間傳遞擷取到的值與結果
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub outcomes: Vec<CheckOutcome>,
    variables: HashMap<String, Value>,
}

impl RunContext {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            outcomes: Vec::new(),
            variables: HashMap::new(),
        }
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Later captures with the same name overwrite earlier ones.
    pub fn set_variable(&mut self, name: String, value: Value) {
        self.variables.insert(name, value);
    }

    pub fn get_outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn passed(&self, name: &str) -> bool {
        self.get_outcome(name)
            .map(|o| o.status == CheckStatus::Pass)
            .unwrap_or(false)
    }

    pub fn add_outcome(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_variables_overwrite() {
        let mut context = RunContext::new("run".to_string());
        context.set_variable("token".to_string(), Value::String("a".to_string()));
        context.set_variable("token".to_string(), Value::String("b".to_string()));
        assert_eq!(context.get_variable("token").unwrap(), "b");
        assert!(context.get_variable("other").is_none());
    }

    #[test]
    fn test_passed_lookup() {
        let mut context = RunContext::new("run".to_string());
        context.add_outcome(CheckOutcome::failed("login", "boom".to_string(), Duration::ZERO));
        context.add_outcome(CheckOutcome::skipped("leads", "login failed".to_string()));
        assert!(!context.passed("login"));
        assert!(!context.passed("leads"));
        assert!(!context.passed("never-ran"));
    }
}
