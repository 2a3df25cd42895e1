mod entry;
mod logger;

use restbench::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
