use teloxide::{
    prelude::*,
    types::{ChatId, User},
};

use crate::{ConfigParameters, flow::Sender, reply::Reply, texts, ui};

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }

    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let Some(text) = msg.text() else {
        bot.send_message(chat_id, texts::TEXT_ONLY).await?;
        return Ok(());
    };

    let sender = sender_of(from);
    let reply = cfg.conversation.handle(&sender, text).await;
    send_reply(&bot, chat_id, reply).await
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    let mut request = bot.send_message(chat_id, reply.text);
    if let Some(markup) = ui::markup(reply.keyboard) {
        request = request.reply_markup(markup);
    }
    request.await?;
    Ok(())
}

fn sender_of(from: &User) -> Sender {
    Sender {
        user_id: from.id.0.to_string(),
        display_name: from.full_name(),
    }
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) => ids.contains(&from.id),
    }
}
