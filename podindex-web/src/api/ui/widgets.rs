//! Form widgets and result lists
//!
//! Every page is one GET form; changing a dropdown resubmits it so the
//! selection state travels in the query string.

use crate::aggregate::{ClipReport, Fragment, Tally};

use super::layout::escape_html;

/// Option value and display label
pub type Choice = (String, String);

/// Wrap fields in a GET form with a submit button
pub fn form(action: &str, fields: &[String]) -> String {
    format!(
        "<form method=\"get\" action=\"{}\">{}<div><button type=\"submit\">Show</button></div></form>",
        escape_html(action),
        fields.concat()
    )
}

fn selected_attr(is_selected: bool, attr: &str) -> &str {
    if is_selected {
        attr
    } else {
        ""
    }
}

/// Dropdown that resubmits its form on change
pub fn select(name: &str, label: &str, choices: &[Choice], selected: Option<&str>) -> String {
    let options: String = choices
        .iter()
        .map(|(value, text)| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                escape_html(value),
                selected_attr(selected == Some(value.as_str()), " selected"),
                escape_html(text)
            )
        })
        .collect();

    format!(
        "<label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\" onchange=\"this.form.submit()\">{options}</select>",
        name = escape_html(name),
        label = escape_html(label),
        options = options
    )
}

pub fn radio(name: &str, label: &str, choices: &[Choice], selected: Option<&str>) -> String {
    let buttons: String = choices
        .iter()
        .map(|(value, text)| {
            format!(
                "<div><input type=\"radio\" name=\"{}\" value=\"{}\"{} onchange=\"this.form.submit()\"> {}</div>",
                escape_html(name),
                escape_html(value),
                selected_attr(selected == Some(value.as_str()), " checked"),
                escape_html(text)
            )
        })
        .collect();

    format!("<label>{}</label>{}", escape_html(label), buttons)
}

pub fn multi_select(name: &str, label: &str, choices: &[Choice], selected: &[String]) -> String {
    let options: String = choices
        .iter()
        .map(|(value, text)| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                escape_html(value),
                selected_attr(selected.contains(value), " selected"),
                escape_html(text)
            )
        })
        .collect();

    format!(
        "<label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\" multiple size=\"10\">{options}</select>",
        name = escape_html(name),
        label = escape_html(label),
        options = options
    )
}

pub fn text_input(name: &str, label: &str, value: &str) -> String {
    format!(
        "<label for=\"{name}\">{label}</label><input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\">",
        name = escape_html(name),
        label = escape_html(label),
        value = escape_html(value)
    )
}

fn distribution_table(title: &str, tally: &Tally) -> String {
    if tally.is_empty() {
        return format!(
            "<div><h4>{}</h4><p>No matching data found</p></div>",
            escape_html(title)
        );
    }

    let rows: String = tally
        .entries()
        .into_iter()
        .map(|(label, count)| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(label),
                count
            )
        })
        .collect();
    format!(
        "<div><h4>{}</h4><table class=\"distribution\">{}</table></div>",
        escape_html(title),
        rows
    )
}

/// Label distribution followed by one entry per clip
pub fn clip_report(report: &ClipReport) -> String {
    if report.is_empty() {
        return "<p>No clips found.</p>".to_string();
    }

    let insights = format!(
        "<h3>Insights</h3><div class=\"distributions\">{}{}{}</div>",
        distribution_table("Sentiments", &report.sentiments),
        distribution_table("Emotions", &report.emotions),
        distribution_table("Speakers", &report.speakers)
    );

    let clips: String = report
        .clips
        .iter()
        .enumerate()
        .map(|(ix, clip)| {
            format!(
                "<div class=\"clip\"><h4>Clip {}: {}</h4><p>Emotion: {} | Sentiment: {} | Speaker: {}</p><p><a href=\"{url}\" target=\"_blank\">{url}</a></p></div>",
                ix + 1,
                escape_html(&clip.title),
                escape_html(&clip.emotion),
                escape_html(&clip.sentiment),
                escape_html(&clip.speaker),
                url = escape_html(&clip.url)
            )
        })
        .collect();

    format!("{}<h3>Clips</h3>{}", insights, clips)
}

pub fn fragment_list(fragments: &[Fragment]) -> String {
    if fragments.is_empty() {
        return "<p>No fragments found.</p>".to_string();
    }

    fragments
        .iter()
        .enumerate()
        .map(|(ix, fragment)| {
            format!(
                "<div class=\"clip\"><h4>Fragment {}</h4><p>{}</p><p><a href=\"{url}\" target=\"_blank\">{url}</a></p></div>",
                ix + 1,
                escape_html(&fragment.text),
                url = escape_html(&fragment.url)
            )
        })
        .collect()
}
