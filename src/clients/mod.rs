pub mod discord;
pub mod gemini;
pub mod serpapi;
