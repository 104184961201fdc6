use crate::dsl::module::Module;
use crate::dsl::resolve::resolve_statements;
use crate::error::BuildResult;
use crate::hdl::fragment::{Elaboratable, Fragment, Generated, GeneratedFsm, Platform, COMB_DOMAIN};
use crate::hdl::statement::statements_lhs_signals;

impl Module {
    /// Close all open constructs and lower the module into a [Fragment].
    ///
    /// Submodules are elaborated recursively, named ones first. Deferred state machine transitions
    /// are resolved into assignments of the final state encodings.
    pub fn elaborate(mut self, platform: Option<&Platform>) -> BuildResult<Fragment> {
        self.flush_all()?;

        let Module {
            settings: _,
            diags,
            statements,
            ctrl: _,
            top_comb_statements,
            drivers: _,
            named_submodules,
            anon_submodules,
            domains,
            fsms,
            generated,
            src_loc,
        } = self;

        let mut fragment = Fragment::new(src_loc);

        for (name, (submodule, sub_src_loc)) in named_submodules {
            let sub = submodule.elaborate(platform)?;
            fragment.add_subfragment(sub, Some(name), sub_src_loc);
        }
        for (submodule, sub_src_loc) in anon_submodules {
            let sub = submodule.elaborate(platform)?;
            fragment.add_subfragment(sub, None, sub_src_loc);
        }

        for (domain, domain_statements) in statements {
            let domain_statements = resolve_statements(&fsms, domain_statements)?;
            let signals = statements_lhs_signals(&domain_statements);
            fragment.add_statements(&domain, domain_statements);
            for signal in signals {
                fragment.add_driver(signal, &domain);
            }
        }

        if !top_comb_statements.is_empty() {
            let signals = statements_lhs_signals(&top_comb_statements);
            fragment.add_statements(COMB_DOMAIN, top_comb_statements);
            for signal in signals {
                fragment.add_driver(signal, COMB_DOMAIN);
            }
        }

        fragment.add_domains(domains.into_values());

        for (name, fsm) in generated {
            let info = &fsms[fsm];
            // every state machine is closed by now, at the latest by `flush_all`
            let Some(state) = info.signal.clone() else {
                continue;
            };
            let generated_fsm = GeneratedFsm {
                name: name.clone(),
                state,
                encoding: info.encoding.clone(),
            };
            fragment.generated.insert(name, Generated::Fsm(generated_fsm));
        }

        fragment.diagnostics = diags.finish();

        log::debug!(
            "elaborated module at {}: {} domains, {} subfragments, {} generated",
            fragment.src_loc,
            fragment.statements.len(),
            fragment.subfragments.len(),
            fragment.generated.len()
        );
        Ok(fragment)
    }
}

impl Elaboratable for Module {
    fn elaborate(self: Box<Self>, platform: Option<&Platform>) -> BuildResult<Fragment> {
        Module::elaborate(*self, platform)
    }
}
