// File: vkmass-common/src/seed.rs
//
// Static data every session starts from.

use crate::models::{Account, AccountStats, AiAccount, AiProviderId};

pub fn mock_accounts() -> Vec<Account> {
    vec![
        seeded(
            "acc_1",
            "Ivan Tech",
            "185.12.33.11:3128",
            AccountStats { friends_added: 14, groups_joined: 8, comments_posted: 42, clips_commented: 12 },
        ),
        seeded(
            "acc_2",
            "SMM Queen",
            "45.155.203.1:8000",
            AccountStats { friends_added: 5, groups_joined: 2, comments_posted: 15, clips_commented: 3 },
        ),
        seeded(
            "acc_3",
            "Bot Master",
            "91.210.165.55:1080",
            AccountStats { friends_added: 25, groups_joined: 18, comments_posted: 88, clips_commented: 41 },
        ),
    ]
}

/// Provider records; gemini starts active.
pub fn mock_ai_accounts() -> Vec<AiAccount> {
    let mut gemini = AiAccount::new(AiProviderId::Gemini, "Google Gemini", "Google", "gemini-3-flash-preview");
    gemini.is_active = true;
    vec![
        gemini,
        AiAccount::new(AiProviderId::OpenAi, "OpenAI ChatGPT", "OpenAI", "gpt-4o-mini"),
        AiAccount::new(AiProviderId::Grok, "xAI Grok", "xAI", "grok-beta"),
    ]
}

fn seeded(id: &str, name: &str, proxy: &str, stats: AccountStats) -> Account {
    let mut account = Account::new(id, name, proxy);
    account.token = format!("mock_access_token_{}", id.trim_start_matches("acc_"));
    account.stats = stats;
    account
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_unique_ids_and_one_active_provider() {
        let accounts = mock_accounts();
        let mut ids: Vec<_> = accounts.iter().map(|a| a.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert_eq!(mock_ai_accounts().iter().filter(|a| a.is_active).count(), 1);
    }
}
