pub mod cloudinary;
pub mod elevenlabs;
pub mod image_normalizer;
pub mod luma;
pub mod session_store;
pub mod tts;
pub mod vision_llm;

pub use cloudinary::CloudinaryStorage;
pub use elevenlabs::ElevenLabsTtsAdapter;
pub use image_normalizer::JpegNormalizer;
pub use luma::LumaVideoAdapter;
pub use session_store::{InMemorySessionStore, RedisSessionStore, SESSION_TTL};
pub use tts::OpenAiTtsAdapter;
pub use vision_llm::OpenAiVisionAdapter;
