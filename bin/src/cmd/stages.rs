//! Stage listing command implementation.

use valueup_screen::registry::available_stages;

use super::banner;

/// List the screening stages in funnel order.
pub(crate) fn list_stages(verbose: bool) {
    banner("Screening Stages");

    for info in available_stages() {
        println!("{}. {}", info.position, info.name);
        if verbose {
            println!("   {}", info.category.description());
            println!("   pass: {}", info.criterion);
            if info.incumbency_aware {
                println!("   relaxed for current constituents when incumbency is enabled");
            }
        }
    }
    println!();

    if !verbose {
        println!("Use --verbose for pass criteria.\n");
    }
}
