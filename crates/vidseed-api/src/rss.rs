//! RSS feed rendering.

use vidseed_models::VideoEntity;

fn cdata(inner: &str) -> String {
    format!("<![CDATA[{inner}]]>")
}

fn rss_item(video: &VideoEntity) -> String {
    format!(
        r#"    <item>
      <title>{title}</title>
      <pubDate>{published}</pubDate>
      <lastupdated>{updated}</lastupdated>
      <link>{url}</link>
      <description>{description}</description>
      <thumbnail>{url}/thumbnail.jpg</thumbnail>
      <duration>{duration}</duration>
      <views>{views}</views>
    </item>
"#,
        title = cdata(&video.title),
        published = video.published.to_rfc2822(),
        updated = video.updated.to_rfc2822(),
        url = video.url,
        description = cdata(&video.description),
        duration = video.duration,
        views = video.views,
    )
}

/// Render an RSS 2.0 feed for the video library, newest first.
pub fn render_rss(channel_name: &str, videos: &[VideoEntity]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n  <channel>\n",
    );
    out.push_str(&format!("    <title>{}</title>\n", cdata(channel_name)));

    let mut videos: Vec<&VideoEntity> = videos.iter().collect();
    videos.sort_by(|a, b| b.published.cmp(&a.published));
    for video in videos {
        out.push_str(&rss_item(video));
    }

    out.push_str("  </channel>\n</rss>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidseed_models::NewVideo;

    fn video(title: &str) -> VideoEntity {
        VideoEntity::from_new(
            1,
            NewVideo {
                title: title.to_string(),
                url: format!("http://localhost/v/{title}"),
                description: "desc & more".to_string(),
                path: "p".to_string(),
                duration: 12.0,
            },
        )
    }

    #[test]
    fn test_feed_structure() {
        let feed = render_rss("Video Channel", &[video("First")]);
        assert!(feed.starts_with("<?xml"));
        assert!(feed.contains("<rss version=\"2.0\">"));
        assert!(feed.contains("<![CDATA[First]]>"));
        assert!(feed.contains("<![CDATA[desc & more]]>"));
        assert!(feed.ends_with("</rss>"));
    }

    #[test]
    fn test_empty_feed_is_valid() {
        let feed = render_rss("Empty", &[]);
        assert!(feed.contains("<channel>"));
        assert!(feed.contains("</rss>"));
    }
}
