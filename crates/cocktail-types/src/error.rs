use thiserror::Error;

#[derive(Error, Debug)]
pub enum CocktailError {
    #[error("robot link error: {0}")]
    RobotLink(String),

    #[error("pump error: {0}")]
    Pump(String),

    #[error("ring buffer full")]
    RingBufferFull,

    #[error("planning error: {0}")]
    Planning(String),

    #[error("ingredients missing: {0:?}")]
    IngredientsMissing(crate::amounts::IngredientAmounts),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid order state: {0}")]
    InvalidOrderState(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type CocktailResult<T> = Result<T, CocktailError>;
