//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, AudioConfig, AudioSettings, ImageCodec, ImageConfig, ImageSettings, Settings,
    VideoConfig, VideoSettings,
};
