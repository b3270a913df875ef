//! Structural fingerprints of MIME trees and frequency statistics over them.

use crate::email_content::mime_type;
use crate::error::Result;
use crate::types::{MessagePart, ShapeCount};

/// Renders one line per part: `indent` spaces, the part's MIME type and a newline.
/// Children follow their parent at `indent + 2`, in document order.
pub fn render_mime_tree(part: &MessagePart, indent: usize) -> Result<String> {
    let mut out = String::new();
    render_into(part, indent, &mut out)?;
    Ok(out)
}

fn render_into(part: &MessagePart, indent: usize, out: &mut String) -> Result<()> {
    out.push_str(&" ".repeat(indent));
    out.push_str(mime_type(part)?);
    out.push('\n');
    for child in part.children() {
        render_into(child, indent + 2, out)?;
    }
    Ok(())
}

/// Counts identical shapes, most frequent first.
///
/// Shapes are sorted lexicographically before grouping and the count sort is
/// stable, so shapes with equal counts stay in lexicographic order.
pub fn aggregate_shapes<S: AsRef<str>>(shapes: &[S]) -> Vec<ShapeCount> {
    let mut sorted: Vec<&str> = shapes.iter().map(|s| s.as_ref()).collect();
    sorted.sort_unstable();

    let mut counts: Vec<ShapeCount> = Vec::new();
    for shape in sorted {
        match counts.last_mut() {
            Some(last) if last.shape == shape => last.count += 1,
            _ => counts.push(ShapeCount {
                shape: shape.to_string(),
                count: 1,
            }),
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
