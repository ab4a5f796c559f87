fn main() {
    println!("cargo:rerun-if-changed=templates");

    // Templates are read from disk with auto-reload in debug builds and
    // compiled into the binary for release builds.
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "debug".to_string());
    if profile == "release" {
        minijinja_embed::embed_templates!("templates");
    }
}
