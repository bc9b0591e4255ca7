//! Text Representation

pub mod vectorizer;

pub use vectorizer::TfidfVectorizer;
