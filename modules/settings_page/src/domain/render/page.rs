//! Settings page renderer
//!
//! One tab per section, one form per section. Each form posts to the
//! options endpoint on its own, so saving a section never touches another.

use super::fields::{render_field, FieldContext};
use super::html::{esc_attr, esc_html};
use crate::config::Config;
use crate::contract::{OptionRecord, RegisteredSection, Registry, Section, SubmitButton};
use crate::domain::hooks::{EditorWidget, FormHooks, NonceProvider};
use crate::domain::tabs::{TabState, ACTIVE_TAB_COOKIE, ACTIVE_TAB_STORAGE_KEY};
use std::collections::HashMap;

/// Form token action of a section
pub fn nonce_action(section_id: &str) -> String {
    format!("{}-options", section_id)
}

/// Everything needed to render the page
pub struct PageContext<'a> {
    pub config: &'a Config,
    pub registry: &'a Registry,
    /// Schema sections, for submit options and form hooks
    pub sections: &'a [Section],
    /// Stored records keyed by section id
    pub records: &'a HashMap<String, OptionRecord>,
    pub nonces: &'a dyn NonceProvider,
    pub hooks: &'a dyn FormHooks,
    pub editor: &'a dyn EditorWidget,
    pub tab: &'a TabState,
}

/// Render the complete page
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let active = ctx
        .tab
        .initial(ctx.registry.sections.iter().map(|s| s.id.as_str()));

    let mut html = String::from(r#"<div class="wrap">"#);
    html.push_str(&format!("<h1>{}</h1>", esc_html(&ctx.config.page_title)));
    html.push_str(&render_navigation(&ctx.registry.sections, active));
    html.push_str(&render_forms(ctx, active));
    html.push_str(&render_script(&ctx.config.class_prefix));
    html.push_str("</div>");
    html
}

/// Tab bar, one link per section
fn render_navigation(sections: &[RegisteredSection], active: Option<&str>) -> String {
    let mut html = String::from(r#"<h2 class="nav-tab-wrapper">"#);
    for tab in sections {
        let class = if Some(tab.id.as_str()) == active {
            "nav-tab nav-tab-active"
        } else {
            "nav-tab"
        };
        html.push_str(&format!(
            r##"<a href="#{id}" class="{class}" id="{id}-tab">{title}</a>"##,
            id = esc_attr(&tab.id),
            class = class,
            title = esc_html(&tab.title)
        ));
    }
    html.push_str("</h2>");
    html
}

fn render_forms(ctx: &PageContext<'_>, active: Option<&str>) -> String {
    let mut html = String::from(r#"<div class="metabox-holder">"#);
    for section in &ctx.registry.sections {
        let hidden = if Some(section.id.as_str()) == active {
            ""
        } else {
            r#" style="display: none;""#
        };
        html.push_str(&format!(
            r#"<div id="{}" class="group"{}>"#,
            esc_attr(&section.id),
            hidden
        ));
        html.push_str(&render_section_form(ctx, section));
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

fn render_section_form(ctx: &PageContext<'_>, section: &RegisteredSection) -> String {
    let schema_section = ctx.sections.iter().find(|s| s.id == section.id);

    let mut html = format!(
        r#"<form method="post" action="{}">"#,
        esc_attr(&ctx.config.options_endpoint)
    );
    if let Some(s) = schema_section {
        html.push_str(&ctx.hooks.form_top(s));
    }
    html.push_str(&render_settings_fields(ctx, &section.id));
    html.push_str(&render_settings_section(ctx, section));
    if let Some(s) = schema_section {
        html.push_str(&ctx.hooks.form_bottom(s));
    }

    let default_submit = SubmitButton::default();
    let submit = schema_section.map(|s| &s.submit).unwrap_or(&default_submit);
    html.push_str(&render_submit_button(
        submit,
        &format!("submit_{}", section.id),
        &ctx.config.submit_label,
    ));
    html.push_str("</form>");
    html
}

/// Hidden fields identifying the section and carrying its nonce
fn render_settings_fields(ctx: &PageContext<'_>, section_id: &str) -> String {
    let nonce = ctx.nonces.create(&nonce_action(section_id));
    format!(
        concat!(
            r#"<input type="hidden" name="option_page" value="{}" />"#,
            r#"<input type="hidden" name="action" value="update" />"#,
            r#"<input type="hidden" name="_nonce" value="{}" />"#,
            r#"<input type="hidden" name="_http_referer" value="{}" />"#
        ),
        esc_attr(section_id),
        esc_attr(&nonce),
        esc_attr(&ctx.config.page_path())
    )
}

/// Section heading, description and one table row per field
fn render_settings_section(ctx: &PageContext<'_>, section: &RegisteredSection) -> String {
    let mut html = String::new();
    if !section.title.is_empty() {
        html.push_str(&format!("<h2>{}</h2>", esc_html(&section.title)));
    }
    if let Some(callback) = &section.callback {
        html.push_str(&callback.resolve());
    }

    let field_ctx = FieldContext {
        record: ctx.records.get(&section.id),
        class_prefix: &ctx.config.class_prefix,
        editor: ctx.editor,
    };

    let mut rows = String::new();
    for field in ctx.registry.fields_of(&section.page) {
        rows.push_str(&format!(
            r#"<tr><th scope="row"><label for="{}">{}</label></th><td>{}</td></tr>"#,
            esc_attr(&field.args.label_for),
            esc_html(&field.label),
            render_field(&field.args, &field_ctx)
        ));
    }
    if !rows.is_empty() {
        html.push_str(r#"<table class="form-table" role="presentation">"#);
        html.push_str(&rows);
        html.push_str("</table>");
    }
    html
}

fn render_submit_button(submit: &SubmitButton, name: &str, default_label: &str) -> String {
    let classes = std::iter::once("button".to_string())
        .chain(submit.kind.split_whitespace().map(|t| match t {
            "primary" | "secondary" | "small" | "large" => format!("button-{}", t),
            "delete" => "button-secondary delete".to_string(),
            other => other.to_string(),
        }))
        .collect::<Vec<_>>()
        .join(" ");

    let attributes: String = submit
        .attributes
        .iter()
        .map(|(k, v)| format!(r#" {}="{}""#, esc_attr(k), esc_attr(v)))
        .collect();

    let button = format!(
        r#"<input type="submit" name="{name}" id="{name}" class="{classes}" value="{label}"{attributes} />"#,
        name = esc_attr(name),
        classes = esc_attr(&classes),
        label = esc_attr(submit.label.as_deref().unwrap_or(default_label)),
        attributes = attributes
    );

    if submit.wrap {
        format!(r#"<p class="submit">{}</p>"#, button)
    } else {
        button
    }
}

const SCRIPT_TEMPLATE: &str = r#"<script>
jQuery( document ).ready( function( $ ) {
	$( '.color-picker' ).iris();

	function remember( tab ) {
		if ( 'undefined' != typeof localStorage ) {
			localStorage.setItem( '__STORAGE_KEY__', tab );
		}
		document.cookie = '__COOKIE__=' + encodeURIComponent( tab ) + '; path=/; SameSite=Lax';
	}

	function show( tab ) {
		$( '.group' ).hide();
		$( tab ).fadeIn();
		$( '.nav-tab-wrapper a' ).removeClass( 'nav-tab-active' );
		$( tab + '-tab' ).addClass( 'nav-tab-active' );
	}

	// The server already rendered the tab from ?tab= or the cookie
	var activetab = $( '.nav-tab-wrapper a.nav-tab-active' ).attr( 'href' ) || '';
	var serverChose = /[?&]tab=/.test( window.location.search ) || -1 !== document.cookie.indexOf( '__COOKIE__=' );
	if ( ! serverChose && 'undefined' != typeof localStorage ) {
		var stored = localStorage.getItem( '__STORAGE_KEY__' ) || '';
		if ( '' != stored && stored != activetab && $( stored ).length ) {
			activetab = stored;
			show( activetab );
		}
	}
	if ( '' != activetab && $( activetab ).length ) {
		remember( activetab );
	}

	$( '.nav-tab-wrapper a' ).click( function( evt ) {
		var clicked_group = $( this ).attr( 'href' );
		show( clicked_group );
		$( this ).blur();
		remember( clicked_group );
		evt.preventDefault();
	});

	$( '.__PREFIX__-browse' ).on( 'click', function( event ) {
		event.preventDefault();
		var self = $( this );
		var file_frame = ( wp.media.frames.file_frame = wp.media({
			title: self.data( 'uploader_title' ),
			button: { text: self.data( 'uploader_button_text' ) },
			multiple: false
		}) );
		file_frame.on( 'select', function() {
			var attachment = file_frame.state().get( 'selection' ).first().toJSON();
			self.prev( '.__PREFIX__-url' ).val( attachment.url ).change();
		});
		file_frame.open();
	});

	$( 'input.__PREFIX__-url' )
		.on( 'change keyup paste input', function() {
			var self = $( this );
			self.next().parent().children( '.__PREFIX__-image-preview' ).children( 'img' ).attr( 'src', self.val() );
		})
		.change();
});
</script>
<style type="text/css">
#wpbody-content .metabox-holder { padding-top: 5px; }
.__PREFIX__-image-preview img { height: auto; max-width: 70px; }
.__PREFIX__-settings-separator { background: #ccc; border: 0; color: #ccc; height: 1px; position: absolute; left: 0; width: 99%; }
.group .form-table input.color-picker { max-width: 100px; }
</style>"#;

/// Tab switching, color picker and media picker behaviour
pub fn render_script(class_prefix: &str) -> String {
    let prefix: String = class_prefix
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    SCRIPT_TEMPLATE
        .replace("__STORAGE_KEY__", ACTIVE_TAB_STORAGE_KEY)
        .replace("__COOKIE__", ACTIVE_TAB_COOKIE)
        .replace("__PREFIX__", &prefix)
}
