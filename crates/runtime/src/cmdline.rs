//! Base command resolution.

const SHELL: &str = "/bin/sh";

/// Resolve the base command line the runtime was started with.
///
/// A configured handler replaces the command entirely. Otherwise a bare
/// `/bin/sh -c SCRIPT` is rewritten so the script receives the invocation's
/// extra arguments as `"$@"`, with the script text itself supplied as `$0`.
/// Every other shape is returned unchanged.
pub fn resolve_command(handler: Option<&str>, base: &[String]) -> Vec<String> {
    if let Some(handler) = handler.filter(|h| !h.is_empty()) {
        return vec![handler.to_string()];
    }

    match base {
        [shell, flag, script] if shell == SHELL && flag == "-c" => vec![
            shell.clone(),
            flag.clone(),
            format!("{script} \"$@\""),
            script.clone(),
        ],
        _ => base.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_command_table() {
        let cases: &[(&str, &[&str], &[&str])] = &[
            ("llama-handler", &[], &["llama-handler"]),
            ("llama-handler", &["hi?"], &["llama-handler"]),
            ("", &[], &[]),
            ("", &["sh", "/"], &["sh", "/"]),
            (
                "",
                &["/bin/sh", "-c", "echo"],
                &["/bin/sh", "-c", r#"echo "$@""#, "echo"],
            ),
            (
                "",
                &["/bin/sh", "-c", "echo", "echo"],
                &["/bin/sh", "-c", "echo", "echo"],
            ),
        ];

        for (handler, input, expected) in cases {
            let handler = (!handler.is_empty()).then_some(*handler);
            let got = resolve_command(handler, &strings(input));
            assert_eq!(
                got,
                strings(expected),
                "handler={handler:?} resolve_command({input:?})"
            );
        }
    }

    #[test]
    fn test_empty_handler_counts_as_unset() {
        let got = resolve_command(Some(""), &strings(&["/bin/echo", "hi"]));
        assert_eq!(got, strings(&["/bin/echo", "hi"]));
    }

    #[test]
    fn test_other_shells_are_not_rewritten() {
        let base = strings(&["/bin/bash", "-c", "echo"]);
        assert_eq!(resolve_command(None, &base), base);
    }
}
