use pokedex_vision::{render, Pokedex};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let image_path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: identify_image <image_path>");
        eprintln!("  requires OPENAI_API_KEY in the environment or a .env file");
        std::process::exit(1);
    });

    let dex = Pokedex::from_env()?;

    println!("Identifying {}...", image_path);

    match dex.identify_file(Path::new(&image_path)).await {
        Ok(found) => {
            println!("Model said {:?} -> looked up '{}'\n", found.guess, found.key);
            print!("{}", render::render_record(&found.record));
        }
        Err(e) => eprintln!("{}", render::render_error(&e)),
    }

    Ok(())
}
