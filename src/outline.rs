use std::fmt::Write;

use crate::canvas::Canvas;
use crate::flow::Flow;

/// Formats a flow's current state into a human-readable outline for
/// debugging: one line per chain stage, the failure stage, then the links
/// with their activation marks.
pub fn outline<C: Canvas>(flow: &Flow<C>) -> String {
    let mut output = String::new();

    for (index, stage) in flow.stages().enumerate() {
        write!(&mut output, "[{}] {:<16} {}", index, stage.label(), stage.status()).unwrap();
        if let Some(progress) = stage.progress() {
            write!(&mut output, " ({})", progress).unwrap();
        }
        output.push('\n');
    }

    if let Some(fail) = flow.fail_stage() {
        writeln!(&mut output, "[F] {:<16} {}", fail.label(), fail.status()).unwrap();
    }

    for link in flow.links() {
        writeln!(
            &mut output,
            "{} -> {} [{}]",
            flow.stage(link.from()).label(),
            flow.stage(link.to()).label(),
            if link.is_active() { "active" } else { "idle" }
        )
        .unwrap();
    }

    output
}
