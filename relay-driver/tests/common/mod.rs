#![allow(dead_code)]

pub mod memory_store;
pub mod scripted_gateway;

use scripted_gateway::{document, menu, text, video, ScriptedGateway};

pub const EXTRACTOR: &str = "@extractor_bot";
pub const UPLOADER: &str = "@uploader_bot";
pub const TOKEN: &str = "tok.1234567890abcdef";

pub const LISTING: &str = "Your batches:\n1. Arjuna JEE 2024\n2. Lakshya NEET 2024\n3. Yakeen NEET 2.0";

/// Extractor bot that answers every step of a successful extraction once.
pub fn script_extractor(gateway: &ScriptedGateway, token: &str, selector: &str) {
    gateway.on_text(
        EXTRACTOR,
        "/start",
        vec![menu("Choose your provider", &["Physics Wallah", "Other"])],
    );
    gateway.on_click(EXTRACTOR, "Physics Wallah", vec![text("Send your token")]);
    gateway.on_text(EXTRACTOR, token, vec![text(LISTING)]);
    gateway.on_text(
        EXTRACTOR,
        selector,
        vec![text("Choose what to extract:\n1. Full batch\n2. Today's class")],
    );
    gateway.on_text(EXTRACTOR, "2", vec![document("Arjuna_JEE.txt")]);
}

/// Uploader bot that answers every preamble question once; `output` follows the final "no".
pub fn script_uploader(gateway: &ScriptedGateway, course: &str, credit: &str, token: &str, output: Vec<relay_core::Message>) {
    gateway.on_text(UPLOADER, "/start", vec![text("Welcome to the uploader")]);
    gateway.on_text(UPLOADER, "/upload", vec![text("Send me the txt file")]);
    gateway.on_document(UPLOADER, vec![text("Send start index")]);
    gateway.on_text(UPLOADER, "1", vec![text("Send batch name")]);
    gateway.on_text(UPLOADER, course, vec![text("Send resolution 480 or 720")]);
    gateway.on_text(UPLOADER, "480", vec![text("Send credit name")]);
    gateway.on_text(UPLOADER, credit, vec![text("Send PW token")]);
    gateway.on_text(UPLOADER, token, vec![text("Send thumbnail url or no")]);
    gateway.on_text(UPLOADER, "no", output);
}

/// Typical uploader output: three videos, one pdf, noise, then the completion message.
pub fn uploader_output() -> Vec<relay_core::Message> {
    vec![
        text("Processing started"),
        video(),
        document("Lecture 1 Notes.pdf"),
        document("index.txt"),
        scripted_gateway::photo(),
        video(),
        video(),
        text("All done ✅"),
    ]
}
