//! Status page rendering.
//!
//! Pure functions from a [`StatusSnapshot`] plus the event log to text.
//! Serving the result (HTTP, file system, Wi-Fi) is left to whatever
//! transport the board is built with.
//!
//! HTML templates use `%NAME%` placeholders:
//!
//! | Placeholder  | Value                                   |
//! |--------------|-----------------------------------------|
//! | `%LOWCLS%`   | `green` if the low probe is wet, else `red` |
//! | `%MIDCLS%`   | same for mid                            |
//! | `%HIGHCLS%`  | same for high                           |
//! | `%PUMP%`     | `ON`, `ON (manual)` or `OFF`            |
//! | `%CYCLES%`   | completed automatic pump cycles         |
//! | `%INTERVAL%` | current poll interval in ms             |
//! | `%LOG%`      | retained events, one `<br>` line each   |

use core::fmt::Write as _;

use serde::Serialize;

use crate::app::events::{EventRecord, StatusSnapshot};

pub const STATUS_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width,initial-scale=1" />
<meta http-equiv="refresh" content="5" />
<title>LevelPump</title>
<style>
  body { font: 16px/1.4 system-ui, sans-serif; margin: 0; padding: 16px; background:#0b1020; color:#eaeef5; }
  .lvl { display:inline-block; width:72px; padding:8px; margin:4px; border-radius:10px; text-align:center; }
  .green { background:#1f9d55; } .red { background:#b83232; }
  pre { background:#111831; border-radius:14px; padding:14px; white-space:pre-wrap; }
</style>
<h1>Reservoir</h1>
<div><span class="lvl %HIGHCLS%">high</span></div>
<div><span class="lvl %MIDCLS%">mid</span></div>
<div><span class="lvl %LOWCLS%">low</span></div>
<p>Pump: <b>%PUMP%</b> &middot; cycles %CYCLES% &middot; poll %INTERVAL% ms</p>
<pre>%LOG%</pre>
</html>
"#;

fn level_class(wet: bool) -> &'static str {
    if wet { "green" } else { "red" }
}

fn pump_label(s: &StatusSnapshot) -> &'static str {
    match (s.pumping, s.manual_override) {
        (true, true) => "ON (manual)",
        (true, false) => "ON",
        (false, _) => "OFF",
    }
}

fn escape_html(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Event lines as HTML, oldest first.
pub fn render_log<'a>(events: impl IntoIterator<Item = &'a EventRecord>) -> String {
    let mut out = String::new();
    for r in events {
        let _ = write!(out, "[{:>8}] ", r.timestamp_ms);
        escape_html(&mut out, &r.text);
        out.push_str("<br>\n");
    }
    out
}

/// Substitute every placeholder in `template`.  Unknown `%...%` runs are
/// left untouched.
pub fn render_status_page<'a>(
    template: &str,
    snapshot: &StatusSnapshot,
    events: impl IntoIterator<Item = &'a EventRecord>,
) -> String {
    template
        .replace("%LOWCLS%", level_class(snapshot.low))
        .replace("%MIDCLS%", level_class(snapshot.mid))
        .replace("%HIGHCLS%", level_class(snapshot.high))
        .replace("%PUMP%", pump_label(snapshot))
        .replace("%CYCLES%", &snapshot.pump_cycles.to_string())
        .replace("%INTERVAL%", &snapshot.interval_ms.to_string())
        .replace("%LOG%", &render_log(events))
}

#[derive(Serialize)]
struct StatusDocument<'a> {
    status: &'a StatusSnapshot,
    events: Vec<&'a EventRecord>,
}

/// Snapshot plus retained events as one JSON document.
pub fn render_status_json<'a>(
    snapshot: &'a StatusSnapshot,
    events: impl IntoIterator<Item = &'a EventRecord>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&StatusDocument {
        status: snapshot,
        events: events.into_iter().collect(),
    })
}
