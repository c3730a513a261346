//! UI Builder module for creating keyboards and formatting review cards

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, UserId};
use teloxide::utils::html;

use crate::dialogue::PhotoRef;
use crate::localization::LocalizationManager;
use crate::review::{ControlToken, ReviewAction, ReviewControl, ReviewPost};

/// Assemble the review card for a translated message
pub fn build_review_post(
    submitter: UserId,
    photo: &PhotoRef,
    body_html: &str,
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> ReviewPost {
    ReviewPost {
        submitter,
        photo: photo.file_id().cloned(),
        body_html: format!(
            "{}\n\n{}",
            html::escape(&localization.t("review-post-header", language_code)),
            body_html
        ),
        controls: vec![
            ReviewControl {
                label: localization.t("review-accept-button", language_code),
                token: ControlToken::new(ReviewAction::Accept, submitter),
            },
            ReviewControl {
                label: localization.t("review-reject-button", language_code),
                token: ControlToken::new(ReviewAction::Reject, submitter),
            },
        ],
    }
}

/// Create the inline keyboard for a review card, all controls on one row
pub fn create_review_keyboard(controls: &[ReviewControl]) -> InlineKeyboardMarkup {
    let row = controls
        .iter()
        .map(|control| InlineKeyboardButton::callback(control.label.clone(), control.token.encode()))
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(vec![row])
}

/// Append a decision annotation to the HTML body currently shown on a review card
pub fn annotate_review_body(current_html: &str, annotation: &str) -> String {
    if current_html.is_empty() {
        return html::escape(annotation);
    }
    format!("{}\n\n{}", current_html, html::escape(annotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::{FileId, InlineKeyboardButtonKind};

    #[test]
    fn test_review_post_without_photo() {
        let localization = LocalizationManager::new().unwrap();
        let post = build_review_post(UserId(99), &PhotoRef::None, "<b>Hi</b>", &localization, None);

        assert!(!post.has_photo());
        assert_eq!(post.body_html, "New message for verification:\n\n<b>Hi</b>");
        assert_eq!(post.controls.len(), 2);
        assert_eq!(post.controls[0].label, "Accept");
        assert_eq!(post.controls[0].token.encode(), "accept|99");
        assert_eq!(post.controls[1].token.encode(), "reject|99");
    }

    #[test]
    fn test_review_post_with_photo() {
        let localization = LocalizationManager::new().unwrap();
        let photo = PhotoRef::File(FileId("AgACAgQ".to_string()));
        let post = build_review_post(UserId(1), &photo, "x", &localization, None);
        assert_eq!(post.photo, Some(FileId("AgACAgQ".to_string())));
    }

    #[test]
    fn test_keyboard_carries_tokens() {
        let localization = LocalizationManager::new().unwrap();
        let post = build_review_post(UserId(5), &PhotoRef::None, "x", &localization, None);
        let keyboard = create_review_keyboard(&post.controls);

        assert_eq!(keyboard.inline_keyboard.len(), 1);
        let data: Vec<String> = keyboard.inline_keyboard[0]
            .iter()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(data, vec!["accept|5", "reject|5"]);
    }

    #[test]
    fn test_annotation_keeps_card_formatting() {
        assert_eq!(
            annotate_review_body(
                "New message for verification:\n\n<b>Gig</b> at <a href=\"https://example.com\">Club</a>",
                "Action: <Accepted>"
            ),
            "New message for verification:\n\n<b>Gig</b> at <a href=\"https://example.com\">Club</a>\n\nAction: &lt;Accepted&gt;"
        );
        assert_eq!(annotate_review_body("", "Oops"), "Oops");
    }
}
