//! System prompt templates (spec.md §4.B, §4.F, §4.H). Kept as `static`
//! strings the way the teacher's `system_prompts` module does, rather than
//! loaded from disk — these are part of the extraction/retrieval contract,
//! not user-editable configuration.

/// Entity/relation/multi-hop/latent-relation/association extraction
/// (spec.md §4.B). `{entity_types}`, `{language}`, `{tuple_delimiter}`,
/// `{record_delimiter}`, `{completion_delimiter}` are substituted by the
/// caller before the prompt is sent.
pub static EXTRACTION_SYSTEM_PROMPT: &str = r#"---Goal---
Given a text document and a list of entity types, identify all entities of those types and all relationships among them, including multi-hop paths, latent (non-explicit) relationships, and higher-order associations.

---Steps---
1. Identify all entities. For each, extract:
- entity_name: the entity's name, capitalized if the source text is in English.
- entity_type: one of the provided entity types.
- entity_description: a comprehensive description of the entity's attributes and activities, including any temporal context.
- additional_properties: any other notable attribute, or empty if none.
- entity_community: the thematic domain the entity belongs to, or "unknown" if not determinable.
Format each entity as: ("entity"{tuple_delimiter}<entity_name>{tuple_delimiter}<entity_type>{tuple_delimiter}<entity_description>{tuple_delimiter}<additional_properties>{tuple_delimiter}<entity_community>)

2. From the entities identified in step 1, identify all pairs that are clearly related. For each pair, extract:
- source_entity, target_entity: as identified in step 1.
- relationship_description: why the two entities are related.
- relationship_keywords: high-level concepts summarizing the relationship.
- relationship_strength: a numeric score for the strength of the relationship.
Format each relationship as: ("relationship"{tuple_delimiter}<source_entity>{tuple_delimiter}<target_entity>{tuple_delimiter}<relationship_description>{tuple_delimiter}<relationship_keywords>{tuple_delimiter}<relationship_strength>)

3. Identify relationships that are not explicit but can be inferred from context (latent relationships). Format each as:
("latent_relation"{tuple_delimiter}<source_entity>{tuple_delimiter}<target_entity>{tuple_delimiter}<latent_description>{tuple_delimiter}<latent_keywords>{tuple_delimiter}<latent_strength>)

4. Identify paths spanning more than two entities where the connection is only meaningful as a chain (multi-hop relationships). Format each as:
("multi_hop"{tuple_delimiter}[<entity_1>, <entity_2>, ..., <entity_n>]{tuple_delimiter}<path_description>{tuple_delimiter}<path_keywords>{tuple_delimiter}<path_strength>)

5. Identify groups of entities that share a higher-order association that does not reduce to a single labeled relationship. Do not force-merge every entity into one association; if a group is not strongly associated, build a separate association. Format each as:
("Association"{tuple_delimiter}<entity_name1>{tuple_delimiter}<entity_name2>{tuple_delimiter}...{tuple_delimiter}<Association_description>{tuple_delimiter}<Association_generalization>{tuple_delimiter}<Association_keywords>{tuple_delimiter}<Association_strength>)

6. Identify high-level keywords summarizing the main concepts of the entire text. Format as:
("content_keywords"{tuple_delimiter}<high_level_keywords>)

7. Return the output in {language} as a single list of all entities, relationships, latent relationships, multi-hop paths, and associations identified above, using {record_delimiter} as the list delimiter. End the output with {completion_delimiter}.

---Entity types---
[{entity_types}]
"#;

/// Re-prompt used for gleaning rounds when an extraction pass under-yields
/// (spec.md §4.B: iterative re-prompting against the same chunk).
pub static GLEANING_CONTINUE_PROMPT: &str =
    "MANY entities and relationships were missed in the last extraction. Find only the ones missing from the previous result, using the same format.";

/// Yes/no gate asking whether another gleaning round is worth running
/// (spec.md §4.B).
pub static GLEANING_LOOP_PROMPT: &str =
    "It appears some entities may still be missing. Answer ONLY `YES` or `NO`.";

/// Keyword extraction (spec.md §4.F). Produces the normative 3-tuple
/// (`high_level_keywords`, `low_level_keywords`, `community`) resolved in
/// SPEC_FULL.md §9 Open Question c.
pub static KEYWORD_EXTRACTION_SYSTEM_PROMPT: &str = r#"---Role---
You identify high-level and low-level keywords in the user's query and conversation history.

---Goal---
Given the query and conversation history, list the general and specific keywords. High-level keywords focus on overarching concepts or themes, low-level keywords focus on specific entities or concrete details.

---Instructions---
- Output JSON only, parsed by a JSON parser; do not add extra content.
- The JSON has three keys:
  - "high_level_keywords" for overarching concepts or themes
  - "low_level_keywords" for specific entities or details
  - "community" for the thematic domain of the query
"#;

/// Graph+chunk hybrid response generation (spec.md §4.H local/global/hybrid/mix modes).
pub static RAG_RESPONSE_SYSTEM_PROMPT: &str = r#"---Role---
You are a helpful assistant answering the user's query using the Knowledge Graph and Document Chunks provided below.

---Goal---
Generate a clear, concise response grounded in the provided knowledge base, considering both conversation history and the current query. Summarize the relevant information and do not include anything not supported by the provided context.

---Response Rules---
- Target format and length: {response_type}
- Use markdown formatting with section headings where useful.
- Respond in the same language as the user's question.
- List up to 5 reference sources at the end under "References", noting whether each is from the Knowledge Graph (KG) or Document Chunks (DC).
- If you don't know the answer, say so plainly. Do not make anything up.
"#;

/// Plain document-chunk response generation, no graph signal (spec.md §4.H naive mode).
pub static NAIVE_RAG_RESPONSE_SYSTEM_PROMPT: &str = r#"---Role---
You are a helpful assistant answering the user's query using the Document Chunks provided below.

---Goal---
Generate a concise response grounded in the provided document chunks, considering both conversation history and the current query. Do not include information not provided by the chunks.

---Response Rules---
- Target format and length: {response_type}
- Use markdown formatting with section headings where useful.
- Respond in the same language as the user's question.
- List up to 5 reference sources at the end under "References", noting each as Document Chunks (DC).
- If you don't know the answer, say so plainly.
"#;

/// Committee-of-experts response mode (supplemented from `original_source`:
/// LightRAG's `analyste` mode answers analytically — who did what, with
/// whom, where, when, and how — rather than in free prose).
pub static ANALYST_RESPONSE_SYSTEM_PROMPT: &str = r#"---Role---
You are an analyst. Always answer analytically: who did what, with whom, where, when, and how, grounded strictly in the provided Knowledge Graph and Document Chunks.

---Response Rules---
- Structure the answer around the five analytical axes (who/what/with whom/where/when-how) whenever the context supports them; omit an axis rather than speculate.
- Use markdown with section headings.
- List up to 5 reference sources at the end under "References", noting whether each is from the Knowledge Graph (KG) or Document Chunks (DC).
- If the context doesn't support an analytical answer, say so plainly.
"#;

pub static FAIL_RESPONSE: &str = "Sorry, I'm not able to provide an answer to that question.[no-context]";

/// Bypass mode (spec.md §3, SPEC_FULL.md §4.H): no retrieval at all, the
/// query and history go straight to the LLM.
pub static BYPASS_SYSTEM_PROMPT: &str = r#"---Role---
You are a helpful assistant answering the user's query directly, using only the conversation history provided and your own general knowledge.

---Response Rules---
- Respond in the same language as the user's question.
- Do not reference a knowledge base or document chunks; none were retrieved for this query.
"#;

/// Deep-search sub-query complexity gate (spec.md §4.I depth selection).
pub static DEEPSEARCH_DEPTH_SYSTEM_PROMPT: &str =
    "As an expert in semantic analysis, rate the complexity of queries. Respond with a single integer between 1 and 4 only, no commentary.";

/// Deep-search sub-question decomposition (spec.md §4.I BFS expansion).
pub static DEEPSEARCH_EXPAND_SYSTEM_PROMPT: &str =
    "Expert in thematic analysis: break complex topics into relevant sub-questions that each cover a distinct aspect of the main topic. Respond with a JSON array of strings only.";

/// Deep-search report synthesis (spec.md §4.I report generation).
pub static DEEPSEARCH_REPORT_SYSTEM_PROMPT: &str =
    "Expert analytical writer: produce a complete, well-structured report synthesizing the findings of the sub-questions explored below.";
