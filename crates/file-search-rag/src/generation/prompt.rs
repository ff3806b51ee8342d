//! System prompts for grounded search

use crate::config::PromptConfig;
use crate::error::{Error, Result};

/// Base system prompt plus selectable alternatives
#[derive(Debug, Clone)]
pub struct PromptSet {
    system: String,
    architecture: Vec<String>,
    selected: usize,
}

impl PromptSet {
    pub fn new(system: impl Into<String>, architecture: Vec<String>) -> Self {
        Self {
            system: system.into(),
            architecture,
            selected: 0,
        }
    }

    pub fn from_config(config: &PromptConfig) -> Self {
        Self {
            system: config.system.clone(),
            architecture: config.architecture.clone(),
            selected: config.selected,
        }
    }

    /// Prompt sent with the next search
    ///
    /// The selected architecture prompt when it exists and is non-blank,
    /// otherwise the base system prompt.
    pub fn active(&self) -> &str {
        match self.architecture.get(self.selected) {
            Some(prompt) if !prompt.trim().is_empty() => prompt,
            _ => &self.system,
        }
    }

    /// Index of the active architecture prompt, `None` when the base prompt is active
    pub fn active_index(&self) -> Option<usize> {
        self.architecture
            .get(self.selected)
            .filter(|p| !p.trim().is_empty())
            .map(|_| self.selected)
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.architecture.len() {
            return Err(Error::invalid_input(format!(
                "Prompt index {} out of range ({} prompts)",
                index,
                self.architecture.len()
            )));
        }
        self.selected = index;
        tracing::info!("Selected architecture prompt {}", index);
        Ok(())
    }

    /// Replace all prompts; the selection is kept when still in range
    pub fn update(&mut self, system: impl Into<String>, architecture: Vec<String>) {
        self.system = system.into();
        self.architecture = architecture;
        if self.selected >= self.architecture.len() {
            self.selected = 0;
        }
        tracing::info!("Prompts updated ({} architecture prompts)", self.architecture.len());
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn architecture(&self) -> &[String] {
        &self.architecture
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::from_config(&PromptConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_prompt_without_alternatives() {
        let prompts = PromptSet::new("base", vec![]);
        assert_eq!(prompts.active(), "base");
        assert_eq!(prompts.active_index(), None);
    }

    #[test]
    fn test_select() {
        let mut prompts = PromptSet::new("base", vec!["apis".into(), "data".into()]);
        assert_eq!(prompts.active(), "apis");
        prompts.select(1).unwrap();
        assert_eq!(prompts.active(), "data");
        assert_eq!(prompts.active_index(), Some(1));
        assert!(prompts.select(2).is_err());
        assert_eq!(prompts.active(), "data");
    }

    #[test]
    fn test_blank_selection_falls_back() {
        let prompts = PromptSet::new("base", vec!["  ".into()]);
        assert_eq!(prompts.active(), "base");
    }

    #[test]
    fn test_update_resets_out_of_range_selection() {
        let mut prompts = PromptSet::new("base", vec!["a".into(), "b".into()]);
        prompts.select(1).unwrap();
        prompts.update("new base", vec!["only".into()]);
        assert_eq!(prompts.system(), "new base");
        assert_eq!(prompts.active(), "only");
    }

    #[test]
    fn test_from_config() {
        let config = PromptConfig {
            system: "sys".into(),
            architecture: vec!["one".into(), "two".into()],
            selected: 5,
        };
        let prompts = PromptSet::from_config(&config);
        assert_eq!(prompts.active(), "sys");
        assert_eq!(prompts.architecture().len(), 2);
    }
}
