use crate::host::{CardId, PageHost};
use crate::log_warn;

const ENABLE_LOGS: bool = true;

const ICON_OPEN: &str = "<div class=\"icon\">";
const DIV_CLOSE: &str = "</div>";

/// Marker attribute set once a card has been split.
pub const SPLIT_MARKER: &str = "data-layout-split";

/// Split card markup into an icon block followed by a content block holding
/// everything else. Returns `None` when the markup has no icon block.
pub fn split_card_markup(markup: &str) -> Option<String> {
    let start = markup.find(ICON_OPEN)?;
    let inner_start = start + ICON_OPEN.len();
    let inner_len = markup[inner_start..].find(DIV_CLOSE)?;
    let inner_end = inner_start + inner_len;

    let icon = &markup[inner_start..inner_end];
    let mut content = String::with_capacity(markup.len());
    content.push_str(&markup[..start]);
    content.push_str(&markup[inner_end + DIV_CLOSE.len()..]);

    Some(format!(
        "<div class=\"icon\">{icon}</div><div class=\"content\">{}</div>",
        content.trim()
    ))
}

/// Restructure every card for the list presentation. Cards already carrying
/// [`SPLIT_MARKER`] are left alone, so repeated calls do not nest content.
/// Returns how many cards were split by this call.
pub fn restructure_cards(page: &dyn PageHost) -> usize {
    let mut split = 0;
    for card in page.cards() {
        if page.card_attribute(card, SPLIT_MARKER).is_some() {
            continue;
        }
        if restructure_card(page, card) {
            split += 1;
        }
    }
    split
}

fn restructure_card(page: &dyn PageHost, card: CardId) -> bool {
    let markup = page.card_markup(card);
    match split_card_markup(&markup) {
        Some(restructured) => {
            page.set_card_markup(card, &restructured);
            page.set_card_attribute(card, SPLIT_MARKER, "true");
            true
        }
        None => {
            log_warn!(
                "Card {:?} ({}) has no icon block; leaving markup unchanged",
                card,
                page.card_option(card).unwrap_or_else(|| "unknown".into())
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn icon_moves_ahead_of_content_block() {
        let markup = "<div class=\"icon\">🚀</div>\n<h3>Scratch</h3>\n<p>Build</p>";
        assert_eq!(
            split_card_markup(markup).unwrap(),
            "<div class=\"icon\">🚀</div><div class=\"content\"><h3>Scratch</h3>\n<p>Build</p></div>"
        );
    }

    #[test]
    fn only_first_icon_block_is_extracted() {
        let markup = "<h3>T</h3><div class=\"icon\">a</div><div class=\"icon\">b</div>";
        assert_eq!(
            split_card_markup(markup).unwrap(),
            "<div class=\"icon\">a</div><div class=\"content\"><h3>T</h3><div class=\"icon\">b</div></div>"
        );
    }

    #[test]
    fn markup_without_icon_is_rejected() {
        assert_eq!(split_card_markup("<h3>No icon</h3>"), None);
        assert_eq!(split_card_markup("<div class=\"icon\">unterminated"), None);
    }
}
