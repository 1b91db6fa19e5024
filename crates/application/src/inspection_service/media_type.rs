use ppecheck_domain::ObjectLocation;

const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Picks the media type sent to the vision model.
///
/// Prefers the stored object's content type, then the trigger's hint, then
/// the object extension, and falls back to `image/jpeg`. Only `image/*`
/// values are accepted from the first two sources.
#[must_use]
pub fn resolve_image_mime_type(
    stored_content_type: Option<&str>,
    content_type_hint: Option<&str>,
    location: &ObjectLocation,
) -> String {
    [stored_content_type, content_type_hint]
        .into_iter()
        .flatten()
        .find_map(image_media_type)
        .or_else(|| {
            location
                .extension()
                .and_then(|extension| mime_type_for_extension(&extension))
                .map(str::to_owned)
        })
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME_TYPE.to_owned())
}

fn image_media_type(content_type: &str) -> Option<String> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    (media_type.starts_with("image/") && media_type.len() > "image/".len()).then_some(media_type)
}

fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}
