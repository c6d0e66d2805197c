//! Gravitation plugin

use qwiery::PluginMethods;
use serde_json::json;

/// Plugin with a single method, `collapse`, returning machine epsilon
pub struct Gravitation;

impl Gravitation {
    pub fn collapse() -> f64 {
        f64::EPSILON
    }

    pub fn plugin() -> PluginMethods {
        PluginMethods::new().with_method("collapse", |_, _| Ok(json!(Gravitation::collapse())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_exposes_collapse() {
        let plugin = Gravitation::plugin();
        assert_eq!(plugin.names().collect::<Vec<_>>(), vec!["collapse"]);
        assert!(Gravitation::collapse() > 0.0);
    }
}
