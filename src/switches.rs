/// Switch declarations and their compilation into git arguments.

/// A toggleable command-line option offered by a menu.
///
/// Enabled state only lives for one menu presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub short_form: String,
    pub long_form: Option<String>,
    pub description: String,
    pub enabled: bool,
}

impl Switch {
    pub fn new(short_form: &str, long_form: &str, description: &str) -> Self {
        Self {
            short_form: short_form.to_string(),
            long_form: Some(long_form.to_string()),
            description: description.to_string(),
            enabled: false,
        }
    }

    /// A switch that only has a short form.
    #[cfg(test)]
    fn short_only(short_form: &str, description: &str) -> Self {
        Self {
            short_form: short_form.to_string(),
            long_form: None,
            description: description.to_string(),
            enabled: false,
        }
    }

    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// The token this switch contributes when enabled.
    /// Falls back to the short form when no long form was declared.
    pub fn token(&self) -> &str {
        self.long_form.as_deref().unwrap_or(&self.short_form)
    }

    /// The single key that toggles this switch in a menu, e.g. `f` for `-f`.
    pub fn key(&self) -> char {
        self.short_form
            .trim_start_matches('-')
            .chars()
            .next()
            .unwrap_or('?')
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

/// Compile switches into argument tokens, one per enabled switch, in declaration order.
pub fn compile_switches(switches: &[Switch]) -> Vec<String> {
    switches
        .iter()
        .filter(|switch| switch.enabled)
        .map(|switch| switch.token().to_string())
        .collect()
}
