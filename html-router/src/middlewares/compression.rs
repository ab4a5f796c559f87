use tower_http::compression::CompressionLayer;

/// Negotiates response encoding from `Accept-Encoding`. Pages listing many
/// conversations compress well.
pub fn compression_layer() -> CompressionLayer {
    CompressionLayer::new().gzip(true).br(true)
}
