//! Field renderers, one per field type
//!
//! Every control is bound to `section[field]` and prefilled from the
//! section's option record, falling back to the field default.

use super::html::{checked, esc_attr, esc_html, esc_textarea, selected};
use crate::contract::{Description, FieldArgs, FieldType, OptionRecord};
use crate::domain::hooks::EditorWidget;
use indexmap::IndexMap;
use serde_json::Value;

/// Everything a renderer needs besides the field itself
pub struct FieldContext<'a> {
    /// Stored record of the field's section, None when never saved
    pub record: Option<&'a OptionRecord>,
    /// Prefix of the browse/url/preview/separator CSS classes
    pub class_prefix: &'a str,
    pub editor: &'a dyn EditorWidget,
}

/// Stored value of a field, or its default
pub fn read_value(record: Option<&OptionRecord>, field_id: &str, default: &Value) -> Value {
    record
        .and_then(|r| r.get(field_id))
        .cloned()
        .unwrap_or_else(|| default.clone())
}

/// Render one field control
pub fn render_field(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    match args.field_type {
        FieldType::Title => String::new(),
        FieldType::Text | FieldType::Url | FieldType::Email | FieldType::Number => {
            render_text(args, ctx)
        }
        FieldType::Checkbox => render_checkbox(args, ctx),
        FieldType::Multicheck => render_multicheck(args, ctx),
        FieldType::Radio => render_radio(args, ctx),
        FieldType::Select => render_select(args, ctx),
        FieldType::Textarea => render_textarea(args, ctx),
        FieldType::Html => render_html(args),
        FieldType::Wysiwyg => render_wysiwyg(args, ctx),
        FieldType::File => render_file(args, ctx, "Choose File", false),
        FieldType::Image => render_file(args, ctx, "Choose Image", true),
        FieldType::Password => render_password(args, ctx),
        FieldType::Color => render_color(args, ctx),
        FieldType::Separator => format!(
            r#"<div class="{}-settings-separator"></div>"#,
            esc_attr(ctx.class_prefix)
        ),
    }
}

/// `<p class="description">` block, empty when there is no description
pub fn field_description(args: &FieldArgs) -> String {
    match description_text(args.desc.as_ref()) {
        Some(text) => format!(r#"<p class="description">{}</p>"#, text),
        None => String::new(),
    }
}

/// Static text escaped, dynamic output verbatim
fn description_text(desc: Option<&Description>) -> Option<String> {
    match desc {
        None => None,
        Some(d) if d.is_empty() => None,
        Some(Description::Static(text)) => Some(esc_html(text)),
        Some(d @ Description::Dynamic(_)) => Some(d.resolve()),
    }
}

/// Scalar value as control text
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => (if *b { "on" } else { "off" }).to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn current_text(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    value_text(&read_value(ctx.record, &args.id, &args.default))
}

fn size_or<'a>(args: &'a FieldArgs, fallback: &'a str) -> &'a str {
    args.size.as_deref().unwrap_or(fallback)
}

/// `section[id]`, escaped for attributes
fn control_name(args: &FieldArgs) -> String {
    esc_attr(&format!("{}[{}]", args.section, args.id))
}

fn choices(options: &IndexMap<String, Value>) -> impl Iterator<Item = (&String, String)> {
    options.iter().map(|(key, label)| (key, esc_html(&value_text(label))))
}

/// Multicheck entries count as checked when stored as true, "on" or their own key
fn is_option_checked(value: &Value, key: &str) -> bool {
    match value.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == key || s == "on" || s == "1",
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

fn render_text(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    let name = control_name(args);
    format!(
        r#"<input type="{}" class="{}-text" id="{}" name="{}" value="{}" placeholder="{}"/>{}"#,
        args.field_type,
        esc_attr(size_or(args, "regular")),
        name,
        name,
        esc_attr(&current_text(args, ctx)),
        esc_attr(&args.placeholder),
        field_description(args)
    )
}

fn render_checkbox(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    let name = control_name(args);
    let id = format!("{}-{}", esc_attr(ctx.class_prefix), name);
    let value = current_text(args, ctx);

    let mut html = String::from("<fieldset>");
    html.push_str(&format!(r#"<label for="{}">"#, id));
    html.push_str(&format!(r#"<input type="hidden" name="{}" value="off" />"#, name));
    html.push_str(&format!(
        r#"<input type="checkbox" class="checkbox" id="{}" name="{}" value="on"{} />"#,
        id,
        name,
        checked(value == "on")
    ));
    html.push_str(&description_text(args.desc.as_ref()).unwrap_or_default());
    html.push_str("</label></fieldset>");
    html
}

fn render_multicheck(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    let value = read_value(ctx.record, &args.id, &args.default);
    let prefix = esc_attr(ctx.class_prefix);

    let mut html = String::from("<fieldset>");
    // Submitted even when every box is cleared
    html.push_str(&format!(r#"<input type="hidden" name="{}" value="" />"#, control_name(args)));
    for (key, label) in choices(&args.options) {
        let name = esc_attr(&format!("{}[{}][{}]", args.section, args.id, key));
        html.push_str(&format!(r#"<label for="{}-{}">"#, prefix, name));
        html.push_str(&format!(
            r#"<input type="checkbox" class="checkbox" id="{}-{}" name="{}" value="{}"{} />"#,
            prefix,
            name,
            name,
            esc_attr(key),
            checked(is_option_checked(&value, key))
        ));
        html.push_str(&format!("{}</label><br>", label));
    }
    html.push_str(&field_description(args));
    html.push_str("</fieldset>");
    html
}

fn render_radio(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    let value = current_text(args, ctx);
    let prefix = esc_attr(ctx.class_prefix);
    let name = control_name(args);

    let mut html = String::from("<fieldset>");
    for (key, label) in choices(&args.options) {
        let id = esc_attr(&format!("{}[{}][{}]", args.section, args.id, key));
        html.push_str(&format!(r#"<label for="{}-{}">"#, prefix, id));
        html.push_str(&format!(
            r#"<input type="radio" class="radio" id="{}-{}" name="{}" value="{}"{} />"#,
            prefix,
            id,
            name,
            esc_attr(key),
            checked(&value == key)
        ));
        html.push_str(&format!("{}</label><br>", label));
    }
    html.push_str(&field_description(args));
    html.push_str("</fieldset>");
    html
}

fn render_select(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    let value = current_text(args, ctx);
    let name = control_name(args);

    let mut html = format!(
        r#"<select class="{}" name="{}" id="{}">"#,
        esc_attr(size_or(args, "regular")),
        name,
        name
    );
    for (key, label) in choices(&args.options) {
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            esc_attr(key),
            selected(&value == key),
            label
        ));
    }
    html.push_str("</select>");
    html.push_str(&field_description(args));
    html
}

fn render_textarea(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    let name = control_name(args);
    format!(
        r#"<textarea rows="5" cols="55" class="{}-text" id="{}" name="{}">{}</textarea>{}"#,
        esc_attr(size_or(args, "regular")),
        name,
        name,
        esc_textarea(&current_text(args, ctx)),
        field_description(args)
    )
}

/// Content injection: the description is trusted markup here
fn render_html(args: &FieldArgs) -> String {
    match &args.desc {
        Some(d) if !d.is_empty() => format!(r#"<p class="description">{}</p>"#, d.resolve()),
        _ => String::new(),
    }
}

fn render_wysiwyg(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    let mut settings = IndexMap::new();
    settings.insert("teeny".to_string(), Value::Bool(true));
    settings.insert(
        "textarea_name".to_string(),
        Value::String(format!("{}[{}]", args.section, args.id)),
    );
    settings.insert("textarea_rows".to_string(), Value::from(10));
    for (key, value) in &args.options {
        settings.insert(key.clone(), value.clone());
    }

    let editor_id = format!("{}-{}", args.section, args.id);
    format!(
        r#"<div style="max-width: {};">{}</div>{}"#,
        esc_attr(size_or(args, "500px")),
        ctx.editor.render(&current_text(args, ctx), &editor_id, &settings),
        field_description(args)
    )
}

fn render_file(args: &FieldArgs, ctx: &FieldContext<'_>, default_label: &str, preview: bool) -> String {
    let name = control_name(args);
    let prefix = esc_attr(ctx.class_prefix);
    let value = esc_attr(&current_text(args, ctx));
    let label = args
        .options
        .get("button_label")
        .map(value_text)
        .unwrap_or_else(|| default_label.to_string());

    let mut html = format!(
        r#"<input type="text" class="{}-text {}-url" id="{}" name="{}" value="{}"/>"#,
        esc_attr(size_or(args, "regular")),
        prefix,
        name,
        name,
        value
    );
    html.push_str(&format!(
        r#"<input type="button" class="button {}-browse" value="{}" />"#,
        prefix,
        esc_attr(&label)
    ));
    html.push_str(&field_description(args));
    if preview {
        html.push_str(&format!(
            r#"<p class="{}-image-preview"><img src="{}"/></p>"#,
            prefix, value
        ));
    }
    html
}

fn render_password(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    let name = control_name(args);
    format!(
        r#"<input type="password" class="{}-text" id="{}" name="{}" value="{}"/>{}"#,
        esc_attr(size_or(args, "regular")),
        name,
        name,
        esc_attr(&current_text(args, ctx)),
        field_description(args)
    )
}

fn render_color(args: &FieldArgs, ctx: &FieldContext<'_>) -> String {
    let name = control_name(args);
    format!(
        r#"<input type="text" class="{}-text color-picker" id="{}" name="{}" value="{}" data-default-color="{}" placeholder="{}" />{}"#,
        esc_attr(size_or(args, "regular")),
        name,
        name,
        esc_attr(&current_text(args, ctx)),
        esc_attr(&value_text(&args.default)),
        esc_attr(&args.placeholder),
        field_description(args)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::FieldSpec;
    use crate::domain::hooks::TextareaEditor;
    use crate::domain::registration::resolve_field;
    use serde_json::json;

    fn ctx(record: Option<&OptionRecord>) -> FieldContext<'_> {
        FieldContext {
            record,
            class_prefix: "sp",
            editor: &TextareaEditor,
        }
    }

    fn record(value: Value) -> OptionRecord {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_read_value_prefers_record() {
        let stored = record(json!({"field1": "v"}));
        let default = json!("d");
        assert_eq!(read_value(Some(&stored), "field1", &default), json!("v"));
        assert_eq!(read_value(None, "field1", &default), json!("d"));
        assert_eq!(read_value(Some(&stored), "other", &default), json!("d"));
    }

    #[test]
    fn test_text_input_mirrors_type() {
        let field = FieldSpec::new("port", "Port", FieldType::Number)
            .with_default(8080)
            .with_placeholder("e.g. 80")
            .with_desc("TCP port");
        let args = resolve_field("general", &field);

        let html = render_field(&args, &ctx(None));
        assert_eq!(
            html,
            r#"<input type="number" class="regular-text" id="general[port]" name="general[port]" value="8080" placeholder="e.g. 80"/><p class="description">TCP port</p>"#
        );
    }

    #[test]
    fn test_text_value_is_escaped() {
        let field = FieldSpec::new("name", "Name", FieldType::Text);
        let args = resolve_field("general", &field);
        let stored = record(json!({"name": "\"><script>"}));

        let html = render_field(&args, &ctx(Some(&stored)));
        assert!(html.contains(r#"value="&quot;&gt;&lt;script&gt;""#));
    }

    #[test]
    fn test_checkbox_has_hidden_off_input() {
        let field = FieldSpec::new("debug", "Debug", FieldType::Checkbox).with_desc("Enable");
        let args = resolve_field("advanced", &field);
        let stored = record(json!({"debug": "on"}));

        let html = render_field(&args, &ctx(Some(&stored)));
        assert_eq!(
            html,
            concat!(
                r#"<fieldset><label for="sp-advanced[debug]">"#,
                r#"<input type="hidden" name="advanced[debug]" value="off" />"#,
                r#"<input type="checkbox" class="checkbox" id="sp-advanced[debug]" name="advanced[debug]" value="on" checked='checked' />"#,
                r#"Enable</label></fieldset>"#
            )
        );

        let html = render_field(&args, &ctx(None));
        assert!(!html.contains("checked='checked'"));
    }

    #[test]
    fn test_multicheck_marks_stored_keys() {
        let field = FieldSpec::new("days", "Days", FieldType::Multicheck)
            .with_option("mon", "Monday")
            .with_option("tue", "Tuesday");
        let args = resolve_field("general", &field);
        let stored = record(json!({"days": {"mon": true, "tue": false}}));

        let html = render_field(&args, &ctx(Some(&stored)));
        assert!(html.contains(
            r#"name="general[days][mon]" value="mon" checked='checked' />Monday</label><br>"#
        ));
        assert!(html.contains(r#"name="general[days][tue]" value="tue" />Tuesday</label><br>"#));
        assert!(html.starts_with(r#"<fieldset><input type="hidden" name="general[days]" value="" />"#));
    }

    #[test]
    fn test_radio_shares_name() {
        let field = FieldSpec::new("mode", "Mode", FieldType::Radio)
            .with_option("a", "A")
            .with_option("b", "B")
            .with_default("b");
        let args = resolve_field("general", &field);

        let html = render_field(&args, &ctx(None));
        assert_eq!(html.matches(r#"name="general[mode]""#).count(), 2);
        assert!(html.contains(r#"value="b" checked='checked'"#));
        assert!(!html.contains(r#"value="a" checked"#));
    }

    #[test]
    fn test_select_marks_selected_option() {
        let field = FieldSpec::new("color", "Color", FieldType::Select)
            .with_option("red", "Red")
            .with_option("blue", "Blue <3");
        let args = resolve_field("general", &field);
        let stored = record(json!({"color": "blue"}));

        let html = render_field(&args, &ctx(Some(&stored)));
        assert_eq!(
            html,
            r#"<select class="regular" name="general[color]" id="general[color]"><option value="red">Red</option><option value="blue" selected='selected'>Blue &lt;3</option></select>"#
        );
    }

    #[test]
    fn test_textarea_escapes_content() {
        let field = FieldSpec::new("bio", "Bio", FieldType::Textarea);
        let args = resolve_field("general", &field);
        let stored = record(json!({"bio": "a < b\nc"}));

        let html = render_field(&args, &ctx(Some(&stored)));
        assert!(html.contains(">a &lt; b\nc</textarea>"));
    }

    #[test]
    fn test_html_injects_description_verbatim() {
        let field = FieldSpec::new("note", "Note", FieldType::Html).with_desc("<strong>Heads up</strong>");
        let args = resolve_field("general", &field);

        assert_eq!(
            render_field(&args, &ctx(None)),
            r#"<p class="description"><strong>Heads up</strong></p>"#
        );
    }

    #[test]
    fn test_dynamic_description_is_verbatim() {
        let field = FieldSpec::new("name", "Name", FieldType::Text)
            .with_desc(Description::dynamic(|| "<em>live</em>".to_string()));
        let args = resolve_field("general", &field);

        assert!(render_field(&args, &ctx(None)).ends_with(r#"<p class="description"><em>live</em></p>"#));
    }

    #[test]
    fn test_wysiwyg_delegates_to_editor() {
        let field = FieldSpec::new("body", "Body", FieldType::Wysiwyg).with_option("textarea_rows", 3);
        let args = resolve_field("general", &field);

        let html = render_field(&args, &ctx(None));
        assert!(html.starts_with(r#"<div style="max-width: 500px;"><textarea class="wp-editor-area teeny" rows="3" id="general-body" name="general[body]">"#));
    }

    #[test]
    fn test_image_has_browse_button_and_preview() {
        let field = FieldSpec::new("logo", "Logo", FieldType::Image).with_option("button_label", "Pick");
        let args = resolve_field("general", &field);
        let stored = record(json!({"logo": "https://example.com/logo.png"}));

        let html = render_field(&args, &ctx(Some(&stored)));
        assert!(html.contains(r#"class="regular-text sp-url""#));
        assert!(html.contains(r#"<input type="button" class="button sp-browse" value="Pick" />"#));
        assert!(html.ends_with(r#"<p class="sp-image-preview"><img src="https://example.com/logo.png"/></p>"#));
    }

    #[test]
    fn test_file_default_button_label() {
        let field = FieldSpec::new("doc", "Doc", FieldType::File);
        let args = resolve_field("general", &field);

        let html = render_field(&args, &ctx(None));
        assert!(html.contains(r#"value="Choose File""#));
        assert!(!html.contains("image-preview"));
    }

    #[test]
    fn test_color_carries_default() {
        let field = FieldSpec::new("accent", "Accent", FieldType::Color).with_default("#ff0000");
        let args = resolve_field("general", &field);

        let html = render_field(&args, &ctx(None));
        assert!(html.contains(r##"class="regular-text color-picker""##));
        assert!(html.contains(r##"data-default-color="#ff0000""##));
    }

    #[test]
    fn test_password_input() {
        let field = FieldSpec::new("secret", "Secret", FieldType::Password).with_size("small");
        let args = resolve_field("general", &field);

        assert!(render_field(&args, &ctx(None)).starts_with(r#"<input type="password" class="small-text""#));
    }

    #[test]
    fn test_separator_has_no_control() {
        let field = FieldSpec::new("sep", "", FieldType::Separator);
        let args = resolve_field("general", &field);

        let html = render_field(&args, &ctx(None));
        assert_eq!(html, r#"<div class="sp-settings-separator"></div>"#);
        assert!(!html.contains("name="));
        assert!(!html.contains("<input"));
    }

    #[test]
    fn test_title_renders_nothing() {
        let field = FieldSpec::new("heading", "Heading", FieldType::Title);
        let args = resolve_field("general", &field);

        assert_eq!(render_field(&args, &ctx(None)), "");
    }
}
