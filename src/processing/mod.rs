//! Text normalization, scoring and ranking

pub mod document;
pub mod keywords;
pub mod lemmatizer;
pub mod normalizer;
pub mod ranker;
pub mod screener;
pub mod section;
pub mod stopwords;
pub mod vectorizer;
