pub mod avatar;
pub mod captcha;
pub mod health;
pub mod image_get;
pub mod image_upload;
