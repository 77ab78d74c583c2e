#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForwardingError {
    #[error("forwarding.invalid_template: {0}")]
    InvalidTemplate(String),
    #[error("forwarding.unknown_parameter: {0}")]
    UnknownParameter(String),
    #[error("forwarding.missing_route_value: {0}")]
    MissingRouteValue(String),
    #[error("forwarding.no_match")]
    NoMatch,
    #[error("forwarding.invalid_target: {0}")]
    InvalidTarget(String),
}
