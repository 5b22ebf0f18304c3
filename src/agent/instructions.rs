//! System prompt assembly: behavioral instructions, tool menu, and the
//! tool-invocation directive contract.

use crate::tools::ToolMenuEntry;

pub fn build_system_prompt(menu: &[ToolMenuEntry]) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        BEHAVIOR_INSTRUCTIONS,
        render_tool_menu(menu),
        DIRECTIVE_CONTRACT
    )
}

const BEHAVIOR_INSTRUCTIONS: &str = "\
You are an expert e-commerce customer service assistant. Your goal is to help \
users with their e-commerce related questions.

Instructions:
1. Carefully analyze the user's query and the conversation history.
2. If the query is about products, use the search_products tool to find relevant products.
3. If the query is about order status or details:
   - For a specific customer's orders, use the get_order tool with the customer ID and report all order information.
   - For orders by priority level, use the get_orders_by_priority tool.
4. If no products are found or the results are not satisfactory, suggest alternative search terms or ask for more specific information.
5. For non-product queries, answer directly with helpful and accurate information.
6. Use the conversation history to refer back to earlier questions and products, keep context about user preferences, and avoid repeating information already provided.

Guidelines:
- Be clear and concise, and maintain a professional and friendly tone.
- If you don't know something, be honest about it.
- Keep the conversation focused on e-commerce topics.
- When showing order information, present it in a clear and organized way.
- For priority-based queries, the valid levels are: high, medium, low, critical.";

const DIRECTIVE_CONTRACT: &str = "\
When you need to use a tool, respond ONLY with JSON in this format:
{\"type\":\"tool_call\",\"tool_name\":\"<tool>\",\"tool_args\":{...}}
When you can answer directly, reply with plain text.
Invoke at most one tool per user message.";

fn render_tool_menu(menu: &[ToolMenuEntry]) -> String {
    if menu.is_empty() {
        return "You have no tools available; answer from general knowledge.".to_string();
    }

    let mut lines = vec!["You have access to the following tools:".to_string()];
    for entry in menu {
        let schema = serde_json::to_string(&entry.input_schema).unwrap_or_default();
        lines.push(format!(
            "- {}: {} Input schema: {}",
            entry.name, entry.description, schema
        ));
    }
    lines.join("\n")
}
