//! Replace deferred state machine transitions with plain assignments, once every encoding is final.

use crate::dsl::fsm::{FsmId, FsmInfo};
use crate::error::{BuildError, BuildResult};
use crate::hdl::statement::{FsmNext, Statement, Switch, SwitchCase};
use crate::hdl::value::Const;
use crate::util::arena::Arena;

pub fn resolve_statements(fsms: &Arena<FsmId, FsmInfo>, statements: Vec<Statement>) -> BuildResult<Vec<Statement>> {
    statements
        .into_iter()
        .map(|stmt| resolve_statement(fsms, stmt))
        .collect()
}

fn resolve_statement(fsms: &Arena<FsmId, FsmInfo>, stmt: Statement) -> BuildResult<Statement> {
    match stmt {
        Statement::Assign(_) | Statement::Property(_) => Ok(stmt),
        Statement::Switch(Switch { test, cases, src_loc }) => {
            let cases = cases
                .into_iter()
                .map(|case| {
                    let SwitchCase {
                        patterns,
                        body,
                        src_loc,
                    } = case;
                    Ok(SwitchCase {
                        patterns,
                        body: resolve_statements(fsms, body)?,
                        src_loc,
                    })
                })
                .collect::<BuildResult<_>>()?;
            Ok(Statement::Switch(Switch { test, cases, src_loc }))
        }
        Statement::FsmNext(FsmNext { fsm, state, src_loc }) => {
            let info = &fsms[fsm];
            let (Some(signal), Some(&encoding)) = (&info.signal, info.encoding.get(&state)) else {
                return Err(BuildError::naming(
                    format!("Transition to state '{}' of FSM '{}' cannot be resolved", state, info.name),
                    src_loc,
                ));
            };
            Ok(signal.assign(Const::new(encoding, signal.shape())))
        }
    }
}
