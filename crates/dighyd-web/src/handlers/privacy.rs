//! Static privacy policy page.

use axum::response::Html;

pub const PRIVACY_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Privacy Policy</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; padding: 20px; max-width: 800px; margin: auto; }
        h1, h2 { color: #2c3e50; }
    </style>
</head>
<body>
    <h1>Privacy Policy</h1>
    <p>This service uses the <code>/plot</code> endpoint to generate visualizations of hydrogen storage materials from user-supplied parameters.</p>

    <h2>1. What data do we collect?</h2>
    <p>Only the parameters needed to draw a plot, such as material types, year ranges or element lists. No personal or identifying information is collected.</p>

    <h2>2. How is data used?</h2>
    <p>Parameters are used solely to produce the requested image. They are processed in memory and not stored persistently.</p>

    <h2>3. Do we share data?</h2>
    <p>No data is shared with third parties. All processing happens on our server.</p>

    <h2>4. Data retention</h2>
    <p>Generated images are stored temporarily and deleted automatically once the image store reaches its capacity. Request parameters are discarded immediately after use.</p>

    <h2>5. Contact</h2>
    <p>For questions or requests regarding privacy, contact: <a href="mailto:di.zhang.a8@tohoku.ac.jp">di.zhang.a8@tohoku.ac.jp</a></p>
</body>
</html>
"#;

/// GET /privacy
pub async fn privacy_policy() -> Html<&'static str> {
    Html(PRIVACY_HTML)
}
