/*!
 * Tests for conversation log persistence
 */

use anyhow::Result;
use tixobot::assistant::{Conversation, Role, Turn};

use crate::common;

#[test]
fn test_saveAndLoad_shouldKeepTurnsAndId() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("session.json");

    let mut conversation = Conversation::new();
    conversation.push(Turn::user("¿Cómo compro entradas?"));
    conversation.push(Turn::assistant("Para comprar entradas en Tix.do..."));
    conversation.save(&path)?;

    let loaded = Conversation::load(&path);
    assert_eq!(loaded, conversation);
    assert_eq!(loaded.turns()[0].role, Role::User);
    Ok(())
}

#[test]
fn test_load_missingFile_shouldStartEmpty() {
    let conversation = Conversation::load("/no/such/dir/session.json");
    assert!(conversation.is_empty());
}

#[test]
fn test_load_corruptFile_shouldStartEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "session.json", "[{\"role\": ")?;
    assert!(Conversation::load(&path).is_empty());
    Ok(())
}

#[test]
fn test_load_withoutTimestamps_shouldStillParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "session.json",
        r#"{
            "id": "6f1c2a4e-9a61-4d6f-8a3c-0d2f1b7e5c11",
            "turns": [
                { "role": "user", "content": "hello" },
                { "role": "assistant", "content": "Hi there!" }
            ]
        }"#,
    )?;

    let conversation = Conversation::load(&path);
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation.id().to_string(), "6f1c2a4e-9a61-4d6f-8a3c-0d2f1b7e5c11");
    assert_eq!(conversation.turns()[1].role, Role::Assistant);
    Ok(())
}
