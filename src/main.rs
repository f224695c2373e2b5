use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use lm::cli::{Cli, FLAG_REFERENCE};
use lm::emit::ResolvedModel;
use lm::error::LmResult;
use lm::fs::RealFs;
use lm::gen;
use lm::session::{ProjectMeta, Session};
use lm::{parser, userconfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.flag {
        print!("{FLAG_REFERENCE}");
        return ExitCode::SUCCESS;
    }

    if let Some(path) = &cli.rm {
        return match lm::fs::rm(path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    if let Some(paths) = &cli.cp {
        let (src, dst) = (&paths[0], &paths[1]);
        return match lm::fs::cp(src, dst) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> LmResult<()> {
    let fs = RealFs;

    // Grounded on original_source/source/main.c: when --gen is given, the
    // user .config is never read before parsing lm.cfg, and the run exits
    // immediately after writing the Makefile + a fresh projcfg template,
    // skipping the normal header/.lm.mk/summary path entirely.
    if let Some(makefile_path) = &cli.gen {
        let mut session = Session::new(Default::default());
        session.meta = ProjectMeta {
            project_name: cli.project.clone(),
            build_dir: cli.build.clone(),
            prefix: cli.prefix.clone(),
        };

        let rel = cli.lmcfg.to_string_lossy().into_owned();
        parser::parse_file(&mut session, &fs, Path::new("."), &rel)?;

        let model = ResolvedModel::new(&session);
        let mut makefile_out = std::fs::File::create(makefile_path)?;
        gen::write_makefile(&session.meta, &cli.mk.to_string_lossy(), &mut makefile_out)?;

        let mut projcfg_out = std::fs::File::create(&cli.projcfg)?;
        gen::write_projcfg(&model, &mut projcfg_out)?;

        log::info!("wrote {} and {}", makefile_path.display(), cli.projcfg.display());
        return Ok(());
    }

    let user_table = userconfig::load(&cli.projcfg, false)?;
    let mut session = Session::new(user_table);

    let rel = cli.lmcfg.to_string_lossy().into_owned();
    parser::parse_file(&mut session, &fs, Path::new("."), &rel)?;

    let model = ResolvedModel::new(&session);

    let mut header_out = std::fs::File::create(&cli.out)?;
    gen::write_header(&model, &mut header_out)?;

    let mut mk_out = std::fs::File::create(&cli.mk)?;
    gen::write_lmmk(&model, &mut mk_out)?;

    if !cli.blind {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        gen::write_summary(&model, &mut lock)?;
    }

    Ok(())
}
