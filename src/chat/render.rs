use pulldown_cmark::{ html, Options, Parser };

/// Markdown to HTML, then sanitized so provider output cannot inject script.
pub fn render_markdown(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(text, options);

    let mut raw = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut raw, parser);

    ammonia::clean(&raw)
}
