use subsurf_clean::object::{ModifierStack, Object, ObjectData};
use subsurf_clean::{Context, SmoothMode, SmoothOperator, SmoothOptions, load, save};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut src = None;
    let mut dst = None;
    let mut positions_only = false;
    let mut weld = false;
    let mut option_list: [(_, Option<&str>, &mut bool, &str); 2] = [
        (
            "--positions-only",
            Some("-p"),
            &mut positions_only,
            "Only move vertices, without rebuilding the mesh",
        ),
        (
            "--weld",
            Some("-w"),
            &mut weld,
            "Merge vertices at identical positions before smoothing",
        ),
    ];
    let mut level = 1;
    macro_rules! help {
        () => {{
            eprintln!("[HELP]: \nSmooth a mesh by one subdivision step, keeping its topology.");
            eprintln!("Basic Usage: <bin> src dst");
            for (l, s, _, help) in option_list {
                if let Some(s) = s {
                    eprintln!("\t {s}, {l} : {help}");
                } else {
                    eprintln!("\t {l} : {help}");
                }
            }
            eprintln!("\t -l, --level <N> : Subdivision level to evaluate (default 1)");
            return;
        }};
    }
    let mut args = std::env::args().skip(1);
    while let Some(v) = args.next() {
        if let Some(opt) = option_list
            .iter_mut()
            .find(|opt| opt.0 == v || opt.1.is_some_and(|short| short == v))
        {
            *opt.2 = true;
            continue;
        }
        match v.as_str() {
            "-h" | "--help" => help!(),
            "-l" | "--level" => {
                let Some(l) = args.next().and_then(|l| l.parse::<u32>().ok()) else {
                    help!();
                };
                level = l;
                continue;
            }
            _ => {}
        }

        if src.is_none() {
            src = Some(v);
        } else if dst.is_none() {
            dst = Some(v)
        } else {
            help!();
        };
    }
    let Some(src) = src else {
        help!();
    };
    let Some(dst) = dst else {
        help!();
    };
    if src.starts_with("-") || dst.starts_with("-") {
        help!();
    }
    println!("[INFO]: {src} -> {dst}");

    let mut mesh = match load(&src) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("[ERROR]: Failed to load {src}: {e}");
            std::process::exit(1);
        }
    };
    if weld {
        let n = mesh.weld(0.);
        println!("[INFO]: Welded {n} vertices");
    }

    let name = std::path::Path::new(&src)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Mesh")
        .to_string();
    let mut ctx = Context::new();
    let id = ctx.link_active(Object::new(name, ObjectData::Mesh(mesh)));

    let op = SmoothOperator::new(SmoothOptions {
        level,
        mode: if positions_only {
            SmoothMode::PositionsOnly
        } else {
            SmoothMode::Rebuild
        },
    });
    let res = op.execute(&mut ctx, &ModifierStack);
    if !res.is_finished() {
        eprintln!("[ERROR]: {}", res.report.message);
        std::process::exit(1);
    }
    println!("[INFO]: {}", res.report.message);
    if let Some(rec) = &res.reconstruct {
        let (e, f) = (rec.num_skipped_edges(), rec.num_skipped_faces());
        if e > 0 || f > 0 {
            println!("[INFO]: Skipped {e} edges and {f} faces while rebuilding");
        }
    }

    let Some(mesh) = ctx.get(id).and_then(|o| o.mesh()) else {
        eprintln!("[ERROR]: Mesh disappeared during smoothing");
        std::process::exit(1);
    };
    if let Err(e) = save(&dst, mesh) {
        eprintln!("[ERROR]: Failed to save {dst}: {e}");
        std::process::exit(1);
    }
}
