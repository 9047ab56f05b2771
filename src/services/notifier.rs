//! Notification composition and delivery rules.
//!
//! The [`Notifier`] trait is the transport; [`OutgoingMessage`] and
//! [`deliver`] decide what goes over it for a given ad.

use async_trait::async_trait;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::error::Result;
use crate::models::{Advertisement, MessageConfig, Tier};

/// Largest media group the messaging endpoint accepts.
pub const MAX_MEDIA_GROUP: usize = 10;

/// Transport to one fixed destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a text-only message.
    async fn send_text(&self, caption: &str) -> Result<()>;

    /// Send one photo with the caption attached.
    async fn send_photo(&self, url: &str, caption: &str) -> Result<()>;

    /// Send 2..=10 photos as one group, caption on the first item.
    async fn send_media_group(&self, urls: &[String], caption: &str) -> Result<()>;
}

/// A composed notification, ready for [`deliver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// HTML caption
    pub caption: String,
    /// At most [`MAX_MEDIA_GROUP`] photo URLs
    pub photos: Vec<String>,
}

impl OutgoingMessage {
    /// Build the caption and photo list for `ad`.
    pub fn compose(ad: &Advertisement, tier: Tier, labels: &MessageConfig) -> Self {
        let title = if tier.is_priority() {
            format!("{} | {}", labels.priority_marker, ad.title)
        } else {
            ad.title.clone()
        };

        let caption = format!(
            "<b>{}</b>\n{}: {}\n{}: {}\n\n<a href=\"{}\">{}</a>",
            encode_text(&title),
            encode_text(&labels.price_label),
            encode_text(&ad.price),
            encode_text(&labels.date_label),
            encode_text(&ad.date),
            encode_double_quoted_attribute(&ad.link),
            encode_text(&labels.link_text),
        );

        Self {
            caption,
            photos: ad.photos.iter().take(MAX_MEDIA_GROUP).cloned().collect(),
        }
    }
}

/// Send `message` with the transport call that fits its photo count.
pub async fn deliver(notifier: &dyn Notifier, message: &OutgoingMessage) -> Result<()> {
    match message.photos.as_slice() {
        [] => notifier.send_text(&message.caption).await,
        [photo] => notifier.send_photo(photo, &message.caption).await,
        photos => {
            let photos = &photos[..photos.len().min(MAX_MEDIA_GROUP)];
            notifier.send_media_group(photos, &message.caption).await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Sent {
        Text(String),
        Photo(String),
        Group(Vec<String>),
    }

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<Sent>>,
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn send_text(&self, caption: &str) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Text(caption.to_string()));
            Ok(())
        }

        async fn send_photo(&self, url: &str, _caption: &str) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Photo(url.to_string()));
            Ok(())
        }

        async fn send_media_group(&self, urls: &[String], _caption: &str) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Group(urls.to_vec()));
            Ok(())
        }
    }

    fn ad(photos: usize) -> Advertisement {
        Advertisement {
            id: "1".into(),
            title: "Canon IXUS 135 <б/в>".into(),
            price: "1 500 грн.".into(),
            date: "Сьогодні о 10:15".into(),
            link: "https://www.olx.ua/d/ad.html?a=1&b=2".into(),
            photos: (0..photos).map(|i| format!("https://img/{i}.jpg")).collect(),
        }
    }

    #[test]
    fn test_caption_layout() {
        let message = OutgoingMessage::compose(&ad(0), Tier::Standard, &MessageConfig::default());
        assert_eq!(
            message.caption,
            "<b>Canon IXUS 135 &lt;б/в&gt;</b>\nЦіна: 1 500 грн.\nДата: Сьогодні о 10:15\n\n\
             <a href=\"https://www.olx.ua/d/ad.html?a=1&amp;b=2\">Переглянути оголошення</a>"
        );
    }

    #[test]
    fn test_priority_marker_prefix() {
        let message = OutgoingMessage::compose(&ad(0), Tier::Priority, &MessageConfig::default());
        assert!(message.caption.starts_with("<b>🔥 ПРІОРИТЕТ | Canon IXUS 135"));
    }

    #[test]
    fn test_photos_capped_at_ten() {
        let message = OutgoingMessage::compose(&ad(15), Tier::Standard, &MessageConfig::default());
        assert_eq!(message.photos.len(), MAX_MEDIA_GROUP);
        assert_eq!(message.photos[0], "https://img/0.jpg");
        assert_eq!(message.photos[9], "https://img/9.jpg");
    }

    #[tokio::test]
    async fn test_deliver_picks_transport_by_photo_count() {
        let recorder = Recorder::default();
        let labels = MessageConfig::default();

        for count in [0, 1, 3, 15] {
            let message = OutgoingMessage::compose(&ad(count), Tier::Standard, &labels);
            deliver(&recorder, &message).await.unwrap();
        }

        let sent = recorder.sent.lock().unwrap();
        assert!(matches!(sent[0], Sent::Text(_)));
        assert_eq!(sent[1], Sent::Photo("https://img/0.jpg".into()));
        assert!(matches!(&sent[2], Sent::Group(urls) if urls.len() == 3));
        assert!(matches!(&sent[3], Sent::Group(urls) if urls.len() == 10));
    }
}
