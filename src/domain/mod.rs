//! Domain models for snitch
//!
//! Contains the annotation model and the pure line classification logic,
//! without any I/O concerns.

mod classifier;
mod title;
mod todo;

pub use classifier::{
    AnnotationConfig, Classifier, ClassifierError, TitleConfig, DEFAULT_BODY_SEPARATOR,
    DEFAULT_KEYWORD,
};
pub use title::{TitleError, TitleTransforms, TransformRule};
pub use todo::Todo;
