use serde::{Deserialize, Serialize};

/// Elementwise activation applied after every layer of every phase network.
///
/// Chosen once when a model is built. Parses from its lowercase name:
///
/// ```
/// use phasebridge_model::activation::Activation;
///
/// let activation: Activation = "tanh".parse().unwrap();
/// assert_eq!(activation, Activation::Tanh);
/// assert_eq!(activation.to_string(), "tanh");
/// ```
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[display("identity")]
    Identity,
    #[default]
    #[display("sigmoid")]
    Sigmoid,
    #[display("tanh")]
    Tanh,
    #[display("relu")]
    Relu,
}

impl Activation {
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Identity => x,
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
            Self::Relu => x.max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        assert_eq!(Activation::Identity.apply(-2.5), -2.5);
        assert_eq!(Activation::Sigmoid.apply(0.0), 0.5);
        assert_eq!(Activation::Tanh.apply(0.0), 0.0);
        assert_eq!(Activation::Relu.apply(-3.0), 0.0);
        assert_eq!(Activation::Relu.apply(3.0), 3.0);
        assert!(Activation::Sigmoid.apply(40.0) > 0.999);
    }

    #[test]
    fn test_parse_names() {
        for activation in [
            Activation::Identity,
            Activation::Sigmoid,
            Activation::Tanh,
            Activation::Relu,
        ] {
            let parsed: Activation = activation.to_string().parse().unwrap();
            assert_eq!(parsed, activation);
        }
        assert!("softmax".parse::<Activation>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Activation::Relu).unwrap();
        assert_eq!(json, "\"relu\"");
        let parsed: Activation = serde_json::from_str("\"identity\"").unwrap();
        assert_eq!(parsed, Activation::Identity);
    }
}
