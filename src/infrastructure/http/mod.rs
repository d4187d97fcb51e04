//! HTTP download adapter

mod reqwest_downloader;

pub use reqwest_downloader::ReqwestDownloader;
