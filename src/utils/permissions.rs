/// Pure functions for the administrator gate (Discord-agnostic)

/// Why an admin command was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotAdministrator,
    CodeNotConfigured,
    BadCode,
}

/// What an admin command requires of its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Administrator,
    AdministratorWithCode,
}

/// Decide whether a caller may run an admin command.
///
/// The permission check always runs first, so a non-administrator never
/// learns whether their code was right.
pub fn authorize(
    requirement: Requirement,
    is_administrator: bool,
    provided_code: Option<&str>,
    expected_code: Option<&str>,
) -> Result<(), Denial> {
    if !is_administrator {
        return Err(Denial::NotAdministrator);
    }

    if requirement == Requirement::Administrator {
        return Ok(());
    }

    let expected = expected_code.ok_or(Denial::CodeNotConfigured)?;
    match provided_code {
        Some(code) if code.trim() == expected => Ok(()),
        _ => Err(Denial::BadCode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_admin_denied() {
        assert_eq!(
            authorize(Requirement::Administrator, false, None, None),
            Err(Denial::NotAdministrator)
        );
    }

    #[test]
    fn test_non_admin_denied_even_with_right_code() {
        assert_eq!(
            authorize(
                Requirement::AdministratorWithCode,
                false,
                Some("1234"),
                Some("1234")
            ),
            Err(Denial::NotAdministrator)
        );
    }

    #[test]
    fn test_admin_allowed_without_code() {
        assert!(authorize(Requirement::Administrator, true, None, Some("1234")).is_ok());
    }

    #[test]
    fn test_wrong_code_rejected() {
        assert_eq!(
            authorize(
                Requirement::AdministratorWithCode,
                true,
                Some("0000"),
                Some("1234")
            ),
            Err(Denial::BadCode)
        );
    }

    #[test]
    fn test_missing_code_rejected() {
        assert_eq!(
            authorize(Requirement::AdministratorWithCode, true, None, Some("1234")),
            Err(Denial::BadCode)
        );
    }

    #[test]
    fn test_unconfigured_code_rejected() {
        assert_eq!(
            authorize(Requirement::AdministratorWithCode, true, Some("1234"), None),
            Err(Denial::CodeNotConfigured)
        );
    }

    #[test]
    fn test_right_code_accepted() {
        assert!(
            authorize(
                Requirement::AdministratorWithCode,
                true,
                Some(" 1234 "),
                Some("1234")
            )
            .is_ok()
        );
    }
}
