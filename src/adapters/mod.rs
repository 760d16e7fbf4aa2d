//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod typst_report;

#[cfg(feature = "http")]
pub mod openai_chat_adapter;
#[cfg(feature = "http")]
pub mod yahoo_adapter;
#[cfg(feature = "http")]
pub mod yahoo_news_adapter;
