use kk_types::UserError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TemplateError>;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("{0}")]
    User(#[from] UserError),

    #[error("Template render failed: {0}")]
    Render(#[from] tera::Error),

    #[error("Random generator failed: {0}")]
    Rng(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
