//! Markdown-flavored rendering of a provision's body (§4.4): emphasis,
//! strong and uppercase wrapper elements are unwrapped to their plain text,
//! paragraph numbering stays inline, and list items are rendered onto their
//! own line with a leading `* ` bullet.

use crate::dom::Element;

const LIST_CONTAINERS: &[&str] = &["UnorderedList", "OrderedList"];
const BLOCK_TAGS: &[&str] = &["P1para", "P2para", "P3para", "P4para", "Paragraph", "Text"];

/// Plain-text extraction for short fields (titles, headings, `Pnumber`):
/// every descendant text node, whitespace-collapsed, with list items
/// excluded so a heading that happens to contain a nested list doesn't pull
/// list text inline.
pub fn extract_text(el: &Element) -> String {
    el.text_excluding(LIST_CONTAINERS)
}

/// Renders an element's body as a sequence of newline-separated blocks: one
/// block per paragraph, one block per list item (bulleted). Other container
/// elements (`Part`, `Pblock`, `Schedule`, ...) are walked transparently.
pub fn render_markdown(el: &Element) -> String {
    let mut blocks = Vec::new();
    collect_blocks(el, &mut blocks);
    blocks.join("\n")
}

fn collect_blocks(el: &Element, blocks: &mut Vec<String>) {
    for child in el.child_elements() {
        if LIST_CONTAINERS.contains(&child.name.as_str()) {
            for item in child.child_elements() {
                if item.name == "ListItem" {
                    let text = extract_text(item);
                    if !text.is_empty() {
                        blocks.push(format!("* {text}"));
                    }
                }
            }
            continue;
        }

        if BLOCK_TAGS.contains(&child.name.as_str()) {
            let text = extract_text(child);
            if !text.is_empty() {
                blocks.push(text);
            }
            // A paragraph may itself contain a nested list (§4.4); recurse
            // so its items still get rendered, just after the paragraph text.
            collect_blocks(child, blocks);
            continue;
        }

        collect_blocks(child, blocks);
    }
}
