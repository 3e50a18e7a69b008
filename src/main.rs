mod window;

use std::process;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let text = if args.is_empty() {
        "GLYPH DUST".to_string()
    } else {
        args.join(" ")
    };
    let font_family = std::env::var("GLYPHDUST_FONT").ok();

    if let Err(e) = window::run(text, font_family) {
        eprintln!("{e}");
        process::exit(1);
    }
}
