use crate::models::Volume;
use std::fmt::Write as _;

const STATIC_ROUTES: [(&str, &str, &str); 3] = [
    ("/", "weekly", "1.0"),
    ("/browse", "weekly", "0.8"),
    ("/search", "monthly", "0.5"),
];

fn push_url(out: &mut String, base_url: &str, path: &str, changefreq: &str, priority: &str) {
    let _ = write!(
        out,
        concat!(
            "  <url>\n",
            "    <loc>{}{}</loc>\n",
            "    <changefreq>{}</changefreq>\n",
            "    <priority>{}</priority>\n",
            "  </url>\n"
        ),
        base_url, path, changefreq, priority
    );
}

/// Sitemap with the static pages plus one `/read/{id}` entry per chapter.
pub fn render_sitemap(base_url: &str, hierarchy: &[Volume]) -> String {
    let base_url = base_url.trim_end_matches('/');
    let mut out = String::from(concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    ));

    for (path, changefreq, priority) in STATIC_ROUTES {
        push_url(&mut out, base_url, path, changefreq, priority);
    }

    for chapter in hierarchy
        .iter()
        .flat_map(|volume| volume.parts.iter())
        .flat_map(|part| part.chapters.iter())
    {
        push_url(
            &mut out,
            base_url,
            &format!("/read/{}", chapter.id),
            "monthly",
            "0.7",
        );
    }

    out.push_str("</urlset>");
    out
}
